use anyhow::{bail, Result};
use mfalock_core::config::{LockConfig, WarnLevel};
use mfalock_listener::actuator::Actuator;
use mfalock_listener::ListenerState;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn run(root: &Path, addr: Option<&str>) -> Result<()> {
    let mut config = LockConfig::load_or_default(root);
    if let Some(addr) = addr {
        config.listen_addr = addr.to_string();
    }

    let mut errors = 0;
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Error => {
                tracing::error!("{}", warning.message);
                errors += 1;
            }
            WarnLevel::Warning => tracing::warn!("{}", warning.message),
        }
    }
    if errors > 0 {
        bail!("configuration has {errors} error(s); refusing to listen");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let actuator = Actuator::from_command(
            &config.actuator_command,
            Duration::from_millis(config.ack_timeout_ms),
        )?;
        let state = Arc::new(ListenerState::new(&config, actuator));
        mfalock_listener::serve(&config, state).await
    })
}
