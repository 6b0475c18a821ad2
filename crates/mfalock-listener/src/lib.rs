pub mod actuator;

use actuator::Actuator;
use anyhow::Context;
use mfalock_core::config::LockConfig;
use mfalock_core::event::AuthEvent;
use mfalock_core::session::{SessionCoordinator, SessionOutcome};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// ListenerState
// ---------------------------------------------------------------------------

/// Shared state behind the auth event listener.
///
/// The coordinator mutex is held across the quorum check *and* the
/// actuation cycle, so two event sources can never race into a double
/// actuation.
pub struct ListenerState {
    coordinator: Mutex<SessionCoordinator>,
    actuator: Mutex<Actuator>,
    started: Instant,
    allowed_peers: Vec<IpAddr>,
    unlock_to_lock_delay: Duration,
}

impl ListenerState {
    pub fn new(config: &LockConfig, actuator: Actuator) -> Self {
        let allowed_peers = config
            .allowed_peers
            .iter()
            .filter_map(|s| match s.parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    tracing::warn!(peer = %s, "ignoring unparseable allowed peer");
                    None
                }
            })
            .collect();

        Self {
            coordinator: Mutex::new(SessionCoordinator::from_config(config)),
            actuator: Mutex::new(actuator),
            started: Instant::now(),
            allowed_peers,
            unlock_to_lock_delay: Duration::from_millis(config.unlock_to_lock_delay_ms),
        }
    }

    pub fn coordinator(&self) -> &Mutex<SessionCoordinator> {
        &self.coordinator
    }

    /// Monotonic milliseconds since the listener started.
    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Empty allow-list means any peer may submit events.
    fn peer_allowed(&self, ip: IpAddr) -> bool {
        self.allowed_peers.is_empty() || self.allowed_peers.contains(&ip)
    }
}

// ---------------------------------------------------------------------------
// Serving
// ---------------------------------------------------------------------------

/// Bind the configured address and run the listener until cancelled.
pub async fn serve(config: &LockConfig, state: Arc<ListenerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "auth event listener started");
    serve_on(listener, state).await
}

/// Run the listener on a pre-bound socket (lets callers and tests read the
/// actual port first).
pub async fn serve_on(listener: TcpListener, state: Arc<ListenerState>) -> anyhow::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;

        if !state.peer_allowed(addr.ip()) {
            tracing::warn!(peer = %addr, "rejected connection from unexpected peer");
            continue;
        }
        tracing::info!(peer = %addr, "connection accepted");

        // Connections are handled one at a time; combined with the
        // coordinator mutex this serializes all session mutation.
        if let Err(e) = handle_connection(stream, &state).await {
            tracing::warn!(peer = %addr, "connection error: {e}");
        }
    }
}

async fn handle_connection(stream: TcpStream, state: &ListenerState) -> anyhow::Result<()> {
    let mut lines = BufReader::new(stream).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let event = match AuthEvent::parse(&line) {
            Ok(event) => event,
            Err(e) => {
                // Malformed lines are dropped; they never touch the session.
                tracing::warn!(line = line.trim(), "dropping malformed event: {e}");
                continue;
            }
        };
        process_event(&event, state).await;
    }
    tracing::info!("client disconnected");
    Ok(())
}

/// Feed one parsed event through the coordinator, actuating on quorum.
pub async fn process_event(event: &AuthEvent, state: &ListenerState) {
    let mut coordinator = state.coordinator.lock().await;
    let outcome = coordinator.observe(event, state.now_ms());

    if let SessionOutcome::QuorumReached { methods } = outcome {
        tracing::info!(methods = ?methods, "quorum reached, driving actuator");
        let mut actuator = state.actuator.lock().await;
        actuator.cycle(state.unlock_to_lock_delay).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
