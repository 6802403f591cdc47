//! warp-cli integration: subprocess runner, output parsing, and the
//! connection controller worker

pub mod cli;
pub mod controller;
pub mod parser;

pub use cli::{WarpCli, WarpRunner};
pub use controller::{ConnectionController, ControllerHandle};
pub use parser::{parse_account, status_is_connected, ParseError};
