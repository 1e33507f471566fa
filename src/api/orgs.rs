//! Orgs endpoints

use reqwest::Method;

use super::client::Client;
use super::context::Context;
use super::error::ApiError;
use super::query::FilterSet;
use crate::apitypes::OrgResult;

pub const ORGS_PATH: &str = "/orgs";

/// Makes requests to the registry's orgs endpoints
#[derive(Debug, Clone)]
pub struct OrgsClient {
    client: Client,
}

impl OrgsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// List orgs visible to the session, optionally restricted by name
    pub async fn list(&self, ctx: &Context, names: &[String]) -> Result<Vec<OrgResult>, ApiError> {
        let filters = FilterSet::new().names(names.iter().cloned());
        let request = self
            .client
            .new_request(Method::GET, ORGS_PATH)
            .with_query(filters.to_query());

        self.client.fetch_list(ctx, request).await
    }
}
