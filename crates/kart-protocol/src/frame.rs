//! Text frames exchanged with the name server.
//!
//! Inbound: `name,name,...`, one entry per spot index, no escaping.
//! Outbound: the literal `SCRAMBLE`.

use crate::constants::{NAME_SEPARATOR, SCRAMBLE_COMMAND};

/// Ordered labels, addressed by spot index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameList(Vec<String>);

impl NameList {
    /// Split a comma-separated frame verbatim. Entries are not trimmed and
    /// an empty frame yields a single empty name.
    pub fn parse(frame: &str) -> Self {
        Self(frame.split(NAME_SEPARATOR).map(str::to_string).collect())
    }

    /// `"0"`, `"1"`, ... `"count - 1"`.
    pub fn defaults(count: usize) -> Self {
        Self((0..count).map(|i| i.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Re-encode as an inbound-style frame.
    pub fn to_frame(&self) -> String {
        self.0.join(NAME_SEPARATOR.to_string().as_str())
    }
}

impl From<Vec<String>> for NameList {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl<S: Into<String>> FromIterator<S> for NameList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Commands the client may send to the name server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    /// Ask the server to redistribute names across spots.
    Scramble,
}

impl ClientCommand {
    pub fn as_frame(&self) -> &'static str {
        match self {
            ClientCommand::Scramble => SCRAMBLE_COMMAND,
        }
    }
}
