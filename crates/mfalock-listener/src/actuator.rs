use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

// ---------------------------------------------------------------------------
// ActuatorCommand / AckStatus
// ---------------------------------------------------------------------------

/// The two literal command words the lock bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    Unlock,
    Lock,
}

impl ActuatorCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            ActuatorCommand::Unlock => "unlock",
            ActuatorCommand::Lock => "lock",
        }
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a sent command was acknowledged. Anything but `Confirmed` is logged
/// and tolerated; the drive sequence is biased toward re-securing the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    /// The bridge echoed the command token back.
    Confirmed,
    /// The bridge closed its output without confirming.
    Disconnected,
    /// No confirmation arrived inside the ack window.
    TimedOut,
    /// Writing the command itself failed.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub unlock: AckStatus,
    pub lock: AckStatus,
}

// ---------------------------------------------------------------------------
// ActuatorDriver
// ---------------------------------------------------------------------------

/// Drives the physical lock over a line-oriented port.
///
/// Each command is one word plus newline; success is inferred from an
/// echoed line containing the command token, awaited for at most the ack
/// timeout. A failed or unconfirmed `unlock` never cancels the scheduled
/// `lock`.
#[derive(Debug)]
pub struct ActuatorDriver<R, W> {
    reader: BufReader<R>,
    writer: W,
    ack_timeout: Duration,
}

impl<R, W> ActuatorDriver<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, ack_timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            ack_timeout,
        }
    }

    /// Send one command and wait for its echoed confirmation.
    pub async fn send(&mut self, command: ActuatorCommand) -> AckStatus {
        tracing::info!(%command, "sending actuator command");

        let payload = format!("{command}\n");
        if let Err(e) = self.writer.write_all(payload.as_bytes()).await {
            tracing::error!(%command, "failed to write command: {e}");
            return AckStatus::Failed;
        }
        if let Err(e) = self.writer.flush().await {
            tracing::error!(%command, "failed to flush command: {e}");
            return AckStatus::Failed;
        }

        let wait = async {
            let mut line = String::new();
            loop {
                line.clear();
                match self.reader.read_line(&mut line).await {
                    Ok(0) => return AckStatus::Disconnected,
                    Ok(_) => {
                        if line.contains(command.as_str()) {
                            return AckStatus::Confirmed;
                        }
                        // Unrelated bridge chatter; keep waiting.
                        tracing::debug!(line = line.trim(), "ignoring bridge output");
                    }
                    Err(e) => {
                        tracing::error!("error reading confirmation: {e}");
                        return AckStatus::Failed;
                    }
                }
            }
        };

        match tokio::time::timeout(self.ack_timeout, wait).await {
            Ok(status) => {
                if status == AckStatus::Confirmed {
                    tracing::info!(%command, "command confirmed");
                } else {
                    tracing::warn!(%command, ?status, "command not confirmed");
                }
                status
            }
            Err(_) => {
                tracing::warn!(%command, "timed out waiting for confirmation");
                AckStatus::TimedOut
            }
        }
    }

    /// Unlock, hold for `delay`, then re-lock. The lock command always
    /// fires, whatever happened to the unlock acknowledgement.
    pub async fn cycle(&mut self, delay: Duration) -> CycleReport {
        let unlock = self.send(ActuatorCommand::Unlock).await;
        tokio::time::sleep(delay).await;
        let lock = self.send(ActuatorCommand::Lock).await;
        if lock != AckStatus::Confirmed {
            tracing::error!(?lock, "lock command unconfirmed; lock state unknown");
        }
        CycleReport { unlock, lock }
    }
}

// ---------------------------------------------------------------------------
// Actuator (configured flavor)
// ---------------------------------------------------------------------------

/// The configured actuator: either a spawned bridge process whose stdio is
/// the command port, or log-only when no bridge command is configured.
pub enum Actuator {
    /// No bridge configured; unlock decisions are recorded but nothing is
    /// driven.
    Null,
    Bridge {
        driver: ActuatorDriver<ChildStdout, ChildStdin>,
        child: Child,
    },
}

impl Actuator {
    /// Spawn the bridge command, or fall back to log-only when none is set.
    pub fn from_command(argv: &[String], ack_timeout: Duration) -> anyhow::Result<Self> {
        if argv.is_empty() {
            tracing::info!("no actuator command configured; running log-only");
            return Ok(Actuator::Null);
        }

        let mut child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow::anyhow!("failed to spawn actuator bridge '{}': {e}", argv[0]))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("actuator bridge has no stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("actuator bridge has no stdout"))?;

        tracing::info!(command = %argv.join(" "), "actuator bridge started");
        Ok(Actuator::Bridge {
            driver: ActuatorDriver::new(stdout, stdin, ack_timeout),
            child,
        })
    }

    pub async fn cycle(&mut self, delay: Duration) -> Option<CycleReport> {
        match self {
            Actuator::Null => {
                tracing::info!("unlock decision (log-only, no actuator)");
                None
            }
            Actuator::Bridge { driver, .. } => Some(driver.cycle(delay).await),
        }
    }
}

impl Drop for Actuator {
    fn drop(&mut self) {
        if let Actuator::Bridge { child, .. } = self {
            let _ = child.start_kill();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Bridge double that echoes confirmations for a chosen set of commands.
    fn spawn_bridge(
        confirm: &'static [&'static str],
    ) -> ActuatorDriver<tokio::io::ReadHalf<tokio::io::DuplexStream>, tokio::io::WriteHalf<tokio::io::DuplexStream>>
    {
        let (ours, theirs) = tokio::io::duplex(256);
        tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(theirs);
            let mut lines = BufReader::new(read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let cmd = line.trim().to_string();
                if confirm.contains(&cmd.as_str()) {
                    let reply = format!("{cmd} command executed\n");
                    if write.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                }
            }
        });
        let (read, write) = tokio::io::split(ours);
        ActuatorDriver::new(read, write, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn echoed_token_confirms() {
        let mut driver = spawn_bridge(&["unlock", "lock"]);
        assert_eq!(driver.send(ActuatorCommand::Unlock).await, AckStatus::Confirmed);
        assert_eq!(driver.send(ActuatorCommand::Lock).await, AckStatus::Confirmed);
    }

    #[tokio::test]
    async fn silence_times_out() {
        let mut driver = spawn_bridge(&[]);
        assert_eq!(driver.send(ActuatorCommand::Unlock).await, AckStatus::TimedOut);
    }

    #[tokio::test]
    async fn lock_still_fires_after_failed_unlock_ack() {
        // Bridge only ever confirms "lock".
        let mut driver = spawn_bridge(&["lock"]);
        let report = driver.cycle(Duration::from_millis(10)).await;
        assert_eq!(report.unlock, AckStatus::TimedOut);
        assert_eq!(report.lock, AckStatus::Confirmed);
    }

    #[tokio::test]
    async fn null_actuator_is_log_only() {
        let mut actuator = Actuator::from_command(&[], Duration::from_millis(100)).unwrap();
        assert!(actuator.cycle(Duration::from_millis(1)).await.is_none());
    }
}
