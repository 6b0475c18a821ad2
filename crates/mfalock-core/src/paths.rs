use std::path::{Path, PathBuf};

pub const LOCK_DIR: &str = ".mfalock";

pub fn lock_dir(root: &Path) -> PathBuf {
    root.join(LOCK_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    lock_dir(root).join("config.yaml")
}

pub fn pattern_path(root: &Path) -> PathBuf {
    lock_dir(root).join("pattern.json")
}

/// True once `mfalock init` has run under `root`.
pub fn is_initialized(root: &Path) -> bool {
    lock_dir(root).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_nest_under_lock_dir() {
        let root = Path::new("/tmp/proj");
        assert_eq!(config_path(root), root.join(".mfalock/config.yaml"));
        assert_eq!(pattern_path(root), root.join(".mfalock/pattern.json"));
    }
}
