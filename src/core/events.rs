//! Controller command definitions

use super::state::ModeSelection;

/// Commands accepted by the controller worker.
///
/// All state mutations travel through this queue so that two operations can
/// never interleave their subprocess calls or their writes to the observable
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Disconnect if connected, otherwise run the bounded connect/confirm
    /// retry loop
    ToggleConnection,

    /// Query `warp-cli status` and reconcile the connection state
    RefreshStatus,

    /// Switch the operating mode, then refresh status and account
    SetMode(ModeSelection),

    /// Query `warp-cli account` and replace the account snapshot
    RefreshAccount,

    /// Register a license key with `warp-cli registration license`
    RegisterLicense(String),

    /// Clear the one-shot advisory message after it has been shown
    AcknowledgeAdvisory,
}
