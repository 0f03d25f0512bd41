//! Client-side state engine for the lead dashboard.
//!
//! Construct a [`services::session::LeadSession`] at startup, hand it to
//! whatever renders the dashboard, and call `shutdown` when the session ends.

pub mod config;
pub mod notify;
pub mod services;
pub mod settings;
pub mod state;
