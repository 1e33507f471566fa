//! Resource bodies
//!
//! Plain records carried inside an [`Envelope`](crate::apitypes::Envelope).
//! The registry enforces that the org and project references exist; the
//! client only carries them.

use serde::{Deserialize, Serialize};

use crate::identity::{MutableBody, ResourceType, ID};

/// An organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    pub name: String,
}

impl MutableBody for Org {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Org
    }
}

/// A project, owned by one org
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub org_id: ID,
}

impl MutableBody for Project {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Project
    }
}

/// A service, owned by one org and one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub org_id: ID,
    pub project_id: ID,
}

impl MutableBody for Service {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Service
    }
}
