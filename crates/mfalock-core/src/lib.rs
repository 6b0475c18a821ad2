pub mod arbiter;
pub mod config;
pub mod error;
pub mod event;
pub mod io;
pub mod paths;
pub mod pattern;
pub mod rotary;
pub mod session;
pub mod template;
pub mod types;

pub use error::{LockError, Result};
