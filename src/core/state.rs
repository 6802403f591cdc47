//! Observable connection state

use serde::{Deserialize, Serialize};

/// State of the WARP connection as last reconciled with `warp-cli`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not connected (also the fail-closed result of a failed status query)
    #[default]
    Disconnected,
    /// A toggle or status check is in flight
    Connecting,
    /// `warp-cli status` confirmed the tunnel is up
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
        };
        f.write_str(name)
    }
}

/// Point-in-time copy of the account usage figures reported by `warp-cli account`.
/// Replaced wholesale on each successful refresh, never partially mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Free quota in bytes
    pub quota_bytes: u64,
    /// Premium data in bytes
    pub premium_data_bytes: u64,
    /// Account type label ("Free", "Premium", ...)
    pub account_type: String,
}

/// Operating mode passed to `warp-cli mode`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeSelection {
    /// 1.1.1.1 DNS only (`warp-cli mode proxy`)
    Direct1111,
    /// 1.1.1.1 with the WARP tunnel (`warp-cli mode warp`)
    #[default]
    Warp1111,
}

impl ModeSelection {
    /// Argument for the `warp-cli mode` subcommand
    pub fn cli_arg(&self) -> &'static str {
        match self {
            ModeSelection::Direct1111 => "proxy",
            ModeSelection::Warp1111 => "warp",
        }
    }

    /// Long mode label
    pub fn label(&self) -> &'static str {
        match self {
            ModeSelection::Direct1111 => "1.1.1.1",
            ModeSelection::Warp1111 => "1.1.1.1 with Warp",
        }
    }

    /// Short label used next to the connection indicator
    pub fn display_label(&self) -> &'static str {
        match self {
            ModeSelection::Direct1111 => "Warp",
            ModeSelection::Warp1111 => "WARP",
        }
    }

    /// All selectable modes
    pub fn all() -> &'static [ModeSelection] {
        &[ModeSelection::Direct1111, ModeSelection::Warp1111]
    }
}

impl std::fmt::Display for ModeSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The single owned observable state published by the controller worker.
/// Everything the presentation layer ever sees goes through this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarpStatus {
    /// Current connection state
    pub connection: ConnectionState,
    /// Last successfully parsed account snapshot
    pub account: AccountSnapshot,
    /// Selected operating mode
    pub mode: ModeSelection,
    /// One-shot advisory message; cleared once the presentation layer
    /// acknowledges it
    pub advisory: Option<String>,
}

/// Decimal (1000-based) unit steps
const UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Render a byte count with decimal unit steps and two decimal places
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1000.0 && unit < UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}
