// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod persistence;
pub mod presenter;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod spawner;
pub mod stats;
pub mod target;
pub mod view;

/// Key the session history is stored under
pub const HISTORY_KEY: &str = "snag.history";
