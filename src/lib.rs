//! Warp Deck Companion
//!
//! A headless companion shell for Cloudflare WARP that drives the `warp-cli`
//! control tool and keeps an observable picture of the connection.
//!
//! # Features
//! - Toggles the WARP connection with a bounded connect/confirm retry loop
//! - Polls `warp-cli status` and reconciles the observable connection state
//! - Parses `warp-cli account` output into quota/premium-data snapshots
//! - Switches between the 1.1.1.1 and 1.1.1.1-with-WARP operating modes
//! - Stores registration license keys in a small on-disk list
//! - All mutations serialized through a single controller worker task

pub mod core;
pub mod storage;
pub mod warp;

pub use crate::core::config::{Config, WarpCliConfig};
pub use crate::core::events::ControllerCommand;
pub use crate::core::state::{
    format_bytes, AccountSnapshot, ConnectionState, ModeSelection, WarpStatus,
};
pub use crate::storage::keys::{KeyStore, StoredKey};
pub use crate::warp::cli::{WarpCli, WarpRunner};
pub use crate::warp::controller::{ConnectionController, ControllerHandle};
