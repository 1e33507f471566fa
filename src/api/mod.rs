//! Registry API interaction module
//!
//! Turns resource operations into authenticated registry requests and
//! registry responses into typed envelopes.
//!
//! # Module Structure
//!
//! - [`client`] - Request pipeline shared by every resource client
//! - [`transport`] - The network exchange (reqwest-backed by default)
//! - [`context`] - Cancellation and deadlines for in-flight calls
//! - [`query`] - List filters and query strings
//! - [`progress`] - Advisory progress events
//! - [`orgs`], [`projects`], [`services`] - Resource clients
//!
//! # Example
//!
//! ```ignore
//! use arigato::api::{Client, Context, FilterSet};
//!
//! async fn example(client: &Client) -> Result<(), arigato::api::ApiError> {
//!     let ctx = Context::background();
//!     let services = client.services().list(&ctx, &FilterSet::new().names(["web"])).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod context;
pub mod error;
pub mod orgs;
pub mod progress;
pub mod projects;
pub mod query;
pub mod services;
pub mod transport;

pub use auth::Session;
pub use client::Client;
pub use context::{CancelHandle, Context};
pub use error::{format_api_error, ApiError, CancelReason, ErrorKind};
pub use progress::{Event, EventKind, ProgressFn};
pub use query::{FilterSet, Query};
pub use transport::{HttpTransport, RawResponse, Request, Transport};
