//! `ag orgs`

use anyhow::{anyhow, Result};

use super::output::{self, OutputFormat, TableRow};
use super::{Action, CommandDef, SubcommandDef};
use crate::api::{Client, Context};
use crate::apitypes::OrgResult;
use crate::identity::ID;

pub fn command() -> CommandDef {
    CommandDef {
        name: "orgs",
        about: "View and manage organizations",
        subcommands: vec![SubcommandDef {
            name: "list",
            about: "List organizations associated with your account",
            positional: None,
            flags: Vec::new(),
            action: Action::OrgsList,
        }],
    }
}

impl TableRow for OrgResult {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.body.name.clone()]
    }
}

pub async fn list(ctx: &Context, client: &Client, format: OutputFormat) -> Result<()> {
    let orgs = client.orgs().list(ctx, &[]).await?;
    println!("{}", output::render(&orgs, format)?);
    Ok(())
}

/// Look up the ID of the org called `name`
pub async fn resolve(ctx: &Context, client: &Client, name: &str) -> Result<ID> {
    let orgs = client.orgs().list(ctx, &[name.to_string()]).await?;
    orgs.into_iter()
        .find(|org| org.body.name == name)
        .map(|org| org.id)
        .ok_or_else(|| anyhow!("Org not found: {}", name))
}
