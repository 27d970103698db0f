//! Perspecto client core: configuration, local preferences, screen task
//! scopes, pure view-state reducers and the per-screen state holders.

pub mod config;
pub mod prefs;
pub mod scope;
pub mod telemetry;
pub mod view_state;
pub mod viewmodel;
