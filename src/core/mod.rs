//! Core domain types: configuration, observable state, controller commands

pub mod config;
pub mod events;
pub mod state;
