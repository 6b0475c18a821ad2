use anyhow::{Context, Result};
use mfalock_core::config::LockConfig;
use mfalock_core::event::AuthEvent;
use std::io::Write;
use std::net::TcpStream;
use std::path::Path;

pub fn run(root: &Path, line: &str, addr: Option<&str>) -> Result<()> {
    let event: AuthEvent = line
        .parse()
        .with_context(|| format!("invalid event line \"{line}\""))?;

    let configured;
    let addr = match addr {
        Some(addr) => addr,
        None => {
            configured = LockConfig::load_or_default(root).listen_addr;
            &configured
        }
    };
    let addr = connect_addr(addr);

    let mut stream =
        TcpStream::connect(&addr).with_context(|| format!("failed to connect to {addr}"))?;
    writeln!(stream, "{event}")?;
    println!("sent \"{event}\" to {addr}");
    Ok(())
}

/// A wildcard bind address is not connectable; target loopback instead.
fn connect_addr(addr: &str) -> String {
    match addr.strip_prefix("0.0.0.0:") {
        Some(port) => format!("127.0.0.1:{port}"),
        None => addr.to_string(),
    }
}
