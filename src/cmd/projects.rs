//! `ag projects`

use anyhow::{anyhow, Result};
use clap::ArgMatches;

use super::flags::{name_filter_flag, org_flag};
use super::output::{self, OutputFormat, TableRow};
use super::{flag_value, flag_values, orgs, Action, CommandDef, Positional, SubcommandDef};
use crate::api::{Client, Context, FilterSet};
use crate::apitypes::ProjectResult;
use crate::identity::ID;

pub fn command() -> CommandDef {
    CommandDef {
        name: "projects",
        about: "View and manage projects within an organization",
        subcommands: vec![
            SubcommandDef {
                name: "list",
                about: "List projects within an organization",
                positional: None,
                flags: vec![
                    org_flag("Use this organization.", true),
                    name_filter_flag("Only show projects with this name."),
                ],
                action: Action::ProjectsList,
            },
            SubcommandDef {
                name: "create",
                about: "Create a project in an organization",
                positional: Some(Positional {
                    name: "name",
                    placeholder: "NAME",
                    usage: "Name of the new project",
                }),
                flags: vec![org_flag("Create the project in this organization.", true)],
                action: Action::ProjectsCreate,
            },
        ],
    }
}

impl TableRow for ProjectResult {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.body.name.clone()]
    }
}

pub async fn list(
    ctx: &Context,
    client: &Client,
    args: &ArgMatches,
    format: OutputFormat,
) -> Result<()> {
    let org = flag_value(args, "org").ok_or_else(|| anyhow!("--org is required"))?;
    let org_id = orgs::resolve(ctx, client, org).await?;

    let filters = FilterSet::new()
        .org_ids([org_id])
        .names(flag_values(args, "name"));
    let projects = client.projects().list(ctx, &filters).await?;

    println!("{}", output::render(&projects, format)?);
    Ok(())
}

pub async fn create(ctx: &Context, client: &Client, args: &ArgMatches) -> Result<()> {
    let name = flag_value(args, "name").ok_or_else(|| anyhow!("A project name is required"))?;
    let org = flag_value(args, "org").ok_or_else(|| anyhow!("--org is required"))?;
    let org_id = orgs::resolve(ctx, client, org).await?;

    client.projects().create(ctx, Some(&org_id), name).await?;
    println!("Project {} created.", name);
    Ok(())
}

/// Look up the ID of the project called `name` in `org_id`
pub async fn resolve(ctx: &Context, client: &Client, org_id: ID, name: &str) -> Result<ID> {
    let filters = FilterSet::new().org_ids([org_id]).names([name]);
    let projects = client.projects().list(ctx, &filters).await?;
    projects
        .into_iter()
        .find(|project| project.body.name == name && project.body.org_id == org_id)
        .map(|project| project.id)
        .ok_or_else(|| anyhow!("Project not found: {}", name))
}
