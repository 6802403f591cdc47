//! On-disk persistence for the companion shell

pub mod keys;

pub use keys::{KeyStore, StoredKey};
