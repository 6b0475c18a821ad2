pub mod config;
pub mod init;
pub mod listen;
pub mod pattern;
pub mod send;
pub mod simulate;
