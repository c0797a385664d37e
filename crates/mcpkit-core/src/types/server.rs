//! Server-level metadata.

use serde::{Deserialize, Serialize};

/// Transport a server prefers when none is given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Standard input/output.
    Stdio,
    /// Streamable HTTP.
    Http,
}

impl TransportKind {
    /// Parse a transport literal.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "stdio" => Some(Self::Stdio),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

/// Server metadata declared on the `IServer` interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDetail {
    /// Server version.
    pub version: String,
    /// Default transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportKind>,
    /// Default HTTP port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Whether HTTP sessions are stateful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateful: Option<bool>,
}
