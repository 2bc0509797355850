/// Lifecycle of the single name-server connection.
///
/// `Disconnected -> Connecting -> Open -> Closed | Errored`. A failed
/// handshake goes straight from `Connecting` to `Errored`. `Closed` and
/// `Errored` are terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    /// Only an open connection may carry outbound commands.
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Open)
                | (Connecting, Errored)
                | (Open, Closed)
                | (Open, Errored)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Open => "Open",
            ConnectionState::Closed => "Closed",
            ConnectionState::Errored => "Errored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_never_reconnect() {
        for terminal in [ConnectionState::Closed, ConnectionState::Errored] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(ConnectionState::Connecting));
            assert!(!terminal.can_transition_to(ConnectionState::Open));
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(ConnectionState::Disconnected.can_transition_to(ConnectionState::Connecting));
        assert!(ConnectionState::Connecting.can_transition_to(ConnectionState::Open));
        assert!(ConnectionState::Open.can_transition_to(ConnectionState::Closed));
        assert!(!ConnectionState::Disconnected.can_transition_to(ConnectionState::Open));
    }

    #[test]
    fn test_only_open_is_open() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(!ConnectionState::Closed.is_open());
    }
}
