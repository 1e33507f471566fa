//! Services endpoints

use reqwest::Method;

use super::client::Client;
use super::context::Context;
use super::error::ApiError;
use super::query::FilterSet;
use crate::apitypes::{Envelope, ServiceResult};
use crate::identity::ID;
use crate::primitive::Service;

pub const SERVICES_PATH: &str = "/services";

/// Makes requests to the registry's services endpoints
#[derive(Debug, Clone)]
pub struct ServicesClient {
    client: Client,
}

impl ServicesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// List services matching `filters`, in registry order
    pub async fn list(
        &self,
        ctx: &Context,
        filters: &FilterSet,
    ) -> Result<Vec<ServiceResult>, ApiError> {
        let request = self
            .client
            .new_request(Method::GET, SERVICES_PATH)
            .with_query(filters.to_query());

        self.client.fetch_list(ctx, request).await
    }

    /// Create a new service named `name` under the given org and project
    ///
    /// Fails with [`ApiError::InvalidArgument`] before touching the network
    /// if either owner is missing. Does not return the registry's copy.
    pub async fn create(
        &self,
        ctx: &Context,
        org_id: Option<&ID>,
        project_id: Option<&ID>,
        name: &str,
    ) -> Result<(), ApiError> {
        let (Some(org_id), Some(project_id)) = (org_id, project_id) else {
            return Err(ApiError::InvalidArgument("invalid org or project".to_string()));
        };

        let body = Service {
            name: name.to_string(),
            org_id: *org_id,
            project_id: *project_id,
        };
        let id = self.client.identities().generate(&body)?;
        let service = Envelope::new(id, body);

        let request = self
            .client
            .new_request(Method::POST, SERVICES_PATH)
            .with_json(&service)?;

        self.client.send(ctx, request).await?;
        tracing::info!("Created service {} ({})", name, id);
        Ok(())
    }
}
