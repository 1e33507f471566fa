//! ag command line commands
//!
//! [`commands`] returns the full command list. It is built once in `main`
//! and passed to [`build_cli`] and [`run`]; nothing is registered globally.

pub mod flags;
pub mod orgs;
pub mod output;
pub mod projects;
pub mod services;

use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};

use crate::api::{Client, Context};
use flags::FlagDescriptor;
use output::OutputFormat;

/// What a subcommand does when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OrgsList,
    ProjectsList,
    ProjectsCreate,
    ServicesList,
    ServicesCreate,
}

/// A positional argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positional {
    pub name: &'static str,
    pub placeholder: &'static str,
    pub usage: &'static str,
}

#[derive(Debug, Clone)]
pub struct SubcommandDef {
    pub name: &'static str,
    pub about: &'static str,
    pub positional: Option<Positional>,
    pub flags: Vec<FlagDescriptor>,
    pub action: Action,
}

#[derive(Debug, Clone)]
pub struct CommandDef {
    pub name: &'static str,
    pub about: &'static str,
    pub subcommands: Vec<SubcommandDef>,
}

/// Every ag command
pub fn commands() -> Vec<CommandDef> {
    vec![orgs::command(), projects::command(), services::command()]
}

const SUBCOMMAND_TEMPLATE: &str = "{about-with-newline}\n{usage-heading} {usage}\n\n{after-help}";

impl SubcommandDef {
    fn to_command(&self) -> Command {
        let mut cmd = Command::new(self.name)
            .about(self.about)
            .help_template(SUBCOMMAND_TEMPLATE)
            .after_help(format!("Options:\n{}", flags::render_all(&self.flags)));

        if let Some(positional) = &self.positional {
            cmd = cmd.arg(
                Arg::new(positional.name)
                    .value_name(positional.placeholder)
                    .help(positional.usage)
                    .required(true),
            );
        }
        for flag in &self.flags {
            cmd = cmd.arg(flag.to_arg());
        }

        cmd
    }
}

/// Build the clap command tree for `commands`
pub fn build_cli(commands: &[CommandDef]) -> Command {
    let mut cli = Command::new("ag")
        .version(crate::VERSION)
        .about("A secure, shared workspace for secrets")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("registry")
                .long("registry")
                .global(true)
                .value_name("URI")
                .env(crate::config::REGISTRY_ENV)
                .help("Registry to talk to"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(u64))
                .help("Abort the command after this many seconds"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .global(true)
                .value_name("FORMAT")
                .value_parser(clap::value_parser!(OutputFormat))
                .default_value("table")
                .help("Output format for list commands"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .value_parser(clap::value_parser!(LogLevel))
                .default_value("off")
                .help("Log level for debugging"),
        );

    for def in commands {
        let mut cmd = Command::new(def.name)
            .about(def.about)
            .subcommand_required(true)
            .arg_required_else_help(true);
        for sub in &def.subcommands {
            cmd = cmd.subcommand(sub.to_command());
        }
        cli = cli.subcommand(cmd);
    }

    cli
}

/// Log level for the debug log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Trace => Some(tracing::Level::TRACE),
        }
    }
}

/// Find the subcommand selected in `matches`
pub fn find_action<'a>(
    commands: &[CommandDef],
    matches: &'a ArgMatches,
) -> Option<(Action, &'a ArgMatches)> {
    let (group, group_matches) = matches.subcommand()?;
    let (name, sub_matches) = group_matches.subcommand()?;
    let def = commands.iter().find(|c| c.name == group)?;
    let sub = def.subcommands.iter().find(|s| s.name == name)?;
    Some((sub.action, sub_matches))
}

/// Run the subcommand selected in `matches`
pub async fn run(
    commands: &[CommandDef],
    matches: &ArgMatches,
    ctx: &Context,
    client: &Client,
) -> Result<()> {
    let (action, args) =
        find_action(commands, matches).ok_or_else(|| anyhow!("Unknown command"))?;
    let format = args
        .get_one::<OutputFormat>("output")
        .copied()
        .unwrap_or_default();

    tracing::debug!("Running {:?}", action);

    match action {
        Action::OrgsList => orgs::list(ctx, client, format).await,
        Action::ProjectsList => projects::list(ctx, client, args, format).await,
        Action::ProjectsCreate => projects::create(ctx, client, args).await,
        Action::ServicesList => services::list(ctx, client, args, format).await,
        Action::ServicesCreate => services::create(ctx, client, args).await,
    }
}

/// Value of a single-valued flag
pub(crate) fn flag_value<'a>(args: &'a ArgMatches, name: &str) -> Option<&'a str> {
    args.get_one::<String>(name).map(String::as_str)
}

/// All values of a repeatable flag
pub(crate) fn flag_values(args: &ArgMatches, name: &str) -> Vec<String> {
    args.get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
