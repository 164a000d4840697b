use std::time::Duration;

/// Observable connection lifecycle of a stream consumer.
///
/// `Disconnected` is terminal: it is only reached when the reconnect budget
/// is exhausted and only an explicit re-open leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Error,
    Disconnected,
}

/// Connection state plus the reconnect-attempt counter the UI displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub attempts: u32,
}

/// Fixed-delay, bounded-attempt reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
            max_attempts: 5,
        }
    }
}

/// What the runner should do after feeding a transport event into the FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Continue,
    RetryAfter(Duration),
    GiveUp,
}

/// Connection finite-state machine.
///
/// Transitions are driven solely by transport events (`on_frame`,
/// `on_transport_error`) and the retry timer (`on_retry`); the machine holds
/// no I/O and is exercised directly in tests. The attempt counter increases
/// by exactly one per failed connection attempt and resets to zero on a
/// successful open.
#[derive(Debug)]
pub struct ConnectionFsm {
    status: ConnectionStatus,
    policy: ReconnectPolicy,
}

impl ConnectionFsm {
    /// A freshly opened consumer starts out connecting with a clean counter.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            status: ConnectionStatus {
                state: ConnectionState::Connecting,
                attempts: 0,
            },
            policy,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Any received frame (event or keep-alive comment) proves the
    /// connection is open.
    pub fn on_frame(&mut self) {
        self.status.state = ConnectionState::Connected;
        self.status.attempts = 0;
    }

    /// The transport dropped or the connection attempt failed.
    pub fn on_transport_error(&mut self) -> Directive {
        self.status.attempts += 1;

        if self.status.attempts >= self.policy.max_attempts {
            self.status.state = ConnectionState::Disconnected;
            Directive::GiveUp
        } else {
            self.status.state = ConnectionState::Error;
            Directive::RetryAfter(self.policy.delay)
        }
    }

    /// The retry delay elapsed and the runner is dialing again.
    pub fn on_retry(&mut self) {
        self.status.state = ConnectionState::Connecting;
    }
}
