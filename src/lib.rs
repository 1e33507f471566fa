//! Client access layer for the arigato secrets registry
//!
//! - [`identity`] - Resource IDs and their generation
//! - [`primitive`] - Resource bodies
//! - [`apitypes`] - Versioned `{id, version, body}` envelopes
//! - [`api`] - Request pipeline, transport and resource clients
//! - [`config`] - Persistent configuration
//! - [`cmd`] - The `ag` command line

pub mod api;
pub mod apitypes;
pub mod cmd;
pub mod config;
pub mod identity;
pub mod primitive;

/// Version injected at compile time via AG_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AG_VERSION") {
    Some(v) => v,
    None => "dev",
};
