//! `ag services`

use anyhow::{anyhow, Result};
use clap::ArgMatches;

use super::flags::{name_filter_flag, org_flag, project_flag};
use super::output::{self, OutputFormat, TableRow};
use super::{
    flag_value, flag_values, orgs, projects, Action, CommandDef, Positional, SubcommandDef,
};
use crate::api::{Client, Context, FilterSet};
use crate::apitypes::ServiceResult;

pub fn command() -> CommandDef {
    CommandDef {
        name: "services",
        about: "View and manage services within a project",
        subcommands: vec![
            SubcommandDef {
                name: "list",
                about: "List services for an organization",
                positional: None,
                flags: vec![
                    org_flag("Use this organization.", false),
                    project_flag("Only show services in this project.", false),
                    name_filter_flag("Only show services with this name."),
                ],
                action: Action::ServicesList,
            },
            SubcommandDef {
                name: "create",
                about: "Create a service in a project",
                positional: Some(Positional {
                    name: "name",
                    placeholder: "NAME",
                    usage: "Name of the new service",
                }),
                flags: vec![
                    org_flag("Create the service in this organization.", true),
                    project_flag("Create the service in this project.", true),
                ],
                action: Action::ServicesCreate,
            },
        ],
    }
}

impl TableRow for ServiceResult {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "PROJECT ID"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.body.name.clone(),
            self.body.project_id.to_string(),
        ]
    }
}

pub async fn list(
    ctx: &Context,
    client: &Client,
    args: &ArgMatches,
    format: OutputFormat,
) -> Result<()> {
    let mut filters = FilterSet::new().names(flag_values(args, "name"));

    if let Some(org) = flag_value(args, "org") {
        let org_id = orgs::resolve(ctx, client, org).await?;
        filters = filters.org_ids([org_id]);

        if let Some(project) = flag_value(args, "project") {
            let project_id = projects::resolve(ctx, client, org_id, project).await?;
            filters = filters.project_ids([project_id]);
        }
    } else if flag_value(args, "project").is_some() {
        return Err(anyhow!("--project requires --org"));
    }

    let services = client.services().list(ctx, &filters).await?;
    println!("{}", output::render(&services, format)?);
    Ok(())
}

pub async fn create(ctx: &Context, client: &Client, args: &ArgMatches) -> Result<()> {
    let name = flag_value(args, "name").ok_or_else(|| anyhow!("A service name is required"))?;
    let org = flag_value(args, "org").ok_or_else(|| anyhow!("--org is required"))?;
    let project = flag_value(args, "project").ok_or_else(|| anyhow!("--project is required"))?;

    let org_id = orgs::resolve(ctx, client, org).await?;
    let project_id = projects::resolve(ctx, client, org_id, project).await?;

    client
        .services()
        .create(ctx, Some(&org_id), Some(&project_id), name)
        .await?;
    println!("Service {} created.", name);
    Ok(())
}
