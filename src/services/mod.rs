//! Lead dashboard services.
//!
//! ARCHITECTURE
//! ============
//! `store` holds the pure state transitions and `session` wraps them for
//! presentation code, adding locking, notifications and the background
//! refresh. `source`, `voice` and `scoring` stand in for external systems.

pub mod filter;
pub mod scoring;
pub mod session;
pub mod source;
pub mod store;
pub mod voice;
