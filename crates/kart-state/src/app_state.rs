//! Everything the page shows, owned by a single controller.

use chrono::{DateTime, Utc};
use kart_protocol::{ConnectionState, NameList};

use crate::error::StateError;
use crate::grid::RenderedGrid;
use crate::names::NameState;

const MAX_LOG_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Layout,
    Names,
    Connection,
    Command,
    Error,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Layout => "layout",
            LogCategory::Names => "names",
            LogCategory::Connection => "conn",
            LogCategory::Command => "cmd",
            LogCategory::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub category: LogCategory,
    pub message: String,
}

/// Grid, names and connection status for one session.
#[derive(Debug)]
pub struct AppState {
    pub grid: RenderedGrid,
    pub names: NameState,
    /// Endpoint of the name server, for display.
    pub endpoint: String,
    pub connection: ConnectionState,
    /// Set once the connection is lost; labels will no longer update.
    pub stale: bool,
    pub lost_reason: Option<String>,
    /// Frames received from the name server.
    pub frames_received: u64,
    /// Paints that hit more names than spots.
    pub mismatches: u64,
    pub event_log: Vec<LogEntry>,
}

impl AppState {
    pub fn new(grid: RenderedGrid, names: NameState, endpoint: String) -> Self {
        Self {
            grid,
            names,
            endpoint,
            connection: ConnectionState::Disconnected,
            stale: false,
            lost_reason: None,
            frames_received: 0,
            mismatches: 0,
            event_log: Vec::new(),
        }
    }

    /// Paint the current names without replacing them (startup).
    pub fn paint_current(&mut self) -> Result<(), StateError> {
        let result = self.names.paint(&mut self.grid);
        self.record_paint(&result);
        result
    }

    /// Replace the whole name list with a server frame and repaint.
    pub fn apply_names(&mut self, names: NameList) -> Result<(), StateError> {
        self.frames_received += 1;
        let result = self.names.replace(names, &mut self.grid);
        self.record_paint(&result);
        result
    }

    pub fn set_connection(&mut self, state: ConnectionState) {
        if !self.connection.can_transition_to(state) && self.connection != state {
            tracing::debug!(
                from = self.connection.as_str(),
                to = state.as_str(),
                "Unexpected connection transition"
            );
        }
        self.connection = state;
        if state.is_terminal() {
            self.stale = true;
        }
    }

    /// Record a terminal connection loss. The grid keeps its last labels.
    pub fn mark_lost(&mut self, terminal: ConnectionState, reason: String) {
        self.set_connection(terminal);
        self.stale = true;
        self.push_log(LogCategory::Connection, format!("Connection lost: {reason}"));
        self.lost_reason = Some(reason);
    }

    pub fn push_log(&mut self, category: LogCategory, message: impl Into<String>) {
        self.event_log.push(LogEntry {
            timestamp: Utc::now(),
            category,
            message: message.into(),
        });
        if self.event_log.len() > MAX_LOG_ENTRIES {
            self.event_log.remove(0);
        }
    }

    fn record_paint(&mut self, result: &Result<(), StateError>) {
        match result {
            Ok(()) => self.push_log(
                LogCategory::Names,
                format!("Painted {} names", self.names.names().len()),
            ),
            Err(e) => {
                self.mismatches += 1;
                self.push_log(LogCategory::Error, e.to_string());
            }
        }
    }
}
