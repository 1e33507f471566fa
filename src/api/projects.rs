//! Projects endpoints

use reqwest::Method;

use super::client::Client;
use super::context::Context;
use super::error::ApiError;
use super::query::FilterSet;
use crate::apitypes::{Envelope, ProjectResult};
use crate::identity::ID;
use crate::primitive::Project;

pub const PROJECTS_PATH: &str = "/projects";

/// Makes requests to the registry's projects endpoints
#[derive(Debug, Clone)]
pub struct ProjectsClient {
    client: Client,
}

impl ProjectsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// List projects by org and/or name
    pub async fn list(
        &self,
        ctx: &Context,
        filters: &FilterSet,
    ) -> Result<Vec<ProjectResult>, ApiError> {
        let request = self
            .client
            .new_request(Method::GET, PROJECTS_PATH)
            .with_query(filters.to_query());

        self.client.fetch_list(ctx, request).await
    }

    /// Create a new project named `name` in the given org
    pub async fn create(
        &self,
        ctx: &Context,
        org_id: Option<&ID>,
        name: &str,
    ) -> Result<(), ApiError> {
        let Some(org_id) = org_id else {
            return Err(ApiError::InvalidArgument("invalid org".to_string()));
        };

        let body = Project {
            name: name.to_string(),
            org_id: *org_id,
        };
        let id = self.client.identities().generate(&body)?;
        let project = Envelope::new(id, body);

        let request = self
            .client
            .new_request(Method::POST, PROJECTS_PATH)
            .with_json(&project)?;

        self.client.send(ctx, request).await?;
        tracing::info!("Created project {} ({})", name, id);
        Ok(())
    }
}
