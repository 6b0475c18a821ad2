use std::path::{Path, PathBuf};

/// Resolve the device root: an explicit flag wins, then the nearest
/// ancestor containing `.mfalock/`, then the nearest containing `.git/`,
/// then the current directory.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if let Some(found) = find_up(&cwd, mfalock_core::paths::LOCK_DIR) {
        return found;
    }
    if let Some(found) = find_up(&cwd, ".git") {
        return found;
    }
    cwd
}

fn find_up(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(marker).is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}
