//! Versioned resource envelopes
//!
//! Every object sent to or received from the registry is wrapped in an
//! [`Envelope`]: `{"id": "...", "version": 1, "body": {...}}`.

use serde::{Deserialize, Serialize};

use crate::identity::ID;
use crate::primitive;

/// Version assigned to an object when the client creates it
pub const INITIAL_VERSION: u8 = 1;

/// Generic `{ID, Version, Body}` wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub id: ID,
    pub version: u8,
    pub body: T,
}

impl<T> Envelope<T> {
    /// Wrap a freshly created body. The registry owns every later version.
    pub fn new(id: ID, body: T) -> Self {
        Self {
            id,
            version: INITIAL_VERSION,
            body,
        }
    }
}

pub type OrgResult = Envelope<primitive::Org>;
pub type ProjectResult = Envelope<primitive::Project>;
pub type ServiceResult = Envelope<primitive::Service>;
