//! Persistence Store
//!
//! Serializes the whole manager state to durable storage and restores it at
//! startup.

pub mod persistence;

pub use persistence::{JsonStateStore, LoadedState, ManagerState};
