//! Configuration management
//!
//! Node settings: listen address, bootstrap peers, difficulty and the
//! optional mining address.

pub mod settings;

pub use settings::{Settings, DEFAULT_DIFFICULTY};
