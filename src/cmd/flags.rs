//! Standard flag definitions shared across commands
//!
//! Flags are plain descriptors. [`FlagDescriptor::render`] produces the
//! usage line shown in help output and [`FlagDescriptor::to_arg`] turns the
//! descriptor into a clap argument.

use clap::{Arg, ArgAction};

/// Describes one `--flag PLACEHOLDER` option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDescriptor {
    pub long: &'static str,
    pub short: Option<char>,
    pub placeholder: &'static str,
    pub usage: String,
    pub default: Option<&'static str>,
    pub env_key: Option<&'static str>,
    pub required: bool,
    /// Flag may be repeated, each occurrence adds a value
    pub multiple: bool,
}

impl FlagDescriptor {
    /// Render the usage line, e.g. `--org ORG, -o ORG\tUse this org.`
    pub fn render(&self) -> String {
        let mut names = format!("--{} {}", self.long, self.placeholder);
        if let Some(short) = self.short {
            names.push_str(&format!(", -{} {}", short, self.placeholder));
        }

        let default = match self.default {
            Some(value) if !value.is_empty() => format!(" (default: {})", value),
            _ => String::new(),
        };

        format!("{}\t{}{}", names, self.usage, default)
    }

    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.long)
            .long(self.long)
            .value_name(self.placeholder)
            .help(self.usage.clone())
            .required(self.required)
            .action(if self.multiple {
                ArgAction::Append
            } else {
                ArgAction::Set
            });

        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(env_key) = self.env_key {
            arg = arg.env(env_key);
        }
        if let Some(default) = self.default {
            arg = arg.default_value(default);
        }

        arg
    }
}

fn placeholder(
    long: &'static str,
    short: char,
    placeholder: &'static str,
    usage: &str,
    env_key: &'static str,
    required: bool,
) -> FlagDescriptor {
    FlagDescriptor {
        long,
        short: Some(short),
        placeholder,
        usage: usage.to_string(),
        default: None,
        env_key: Some(env_key),
        required,
        multiple: false,
    }
}

/// `--org ORG` with a custom usage string
pub fn org_flag(usage: &str, required: bool) -> FlagDescriptor {
    placeholder("org", 'o', "ORG", usage, "AG_ORG", required)
}

/// `--project PROJECT` with a custom usage string
pub fn project_flag(usage: &str, required: bool) -> FlagDescriptor {
    placeholder("project", 'p', "PROJECT", usage, "AG_PROJECT", required)
}

/// Repeatable `--name NAME` filter
pub fn name_filter_flag(usage: &str) -> FlagDescriptor {
    FlagDescriptor {
        long: "name",
        short: Some('n'),
        placeholder: "NAME",
        usage: usage.to_string(),
        default: None,
        env_key: None,
        required: false,
        multiple: true,
    }
}

/// Render a block of usage lines, one per flag
pub fn render_all(flags: &[FlagDescriptor]) -> String {
    flags
        .iter()
        .map(|f| format!("   {}", f.render()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_short_and_long() {
        let flag = org_flag("Use this organization.", true);
        assert_eq!(flag.render(), "--org ORG, -o ORG\tUse this organization.");
    }

    #[test]
    fn test_render_default() {
        let mut flag = project_flag("Use this project.", false);
        flag.default = Some("infra");
        assert_eq!(
            flag.render(),
            "--project PROJECT, -p PROJECT\tUse this project. (default: infra)"
        );

        flag.default = Some("");
        assert!(!flag.render().contains("default"));
    }

    #[test]
    fn test_render_without_short() {
        let mut flag = name_filter_flag("Filter by name.");
        flag.short = None;
        assert_eq!(flag.render(), "--name NAME\tFilter by name.");
    }

    #[test]
    fn test_to_arg_parses_repeated_values() {
        let cmd = clap::Command::new("t")
            .arg(name_filter_flag("Filter by name.").to_arg())
            .arg(org_flag("Use this organization.", false).to_arg());
        let matches = cmd
            .try_get_matches_from(["t", "--name", "web", "-n", "api", "-o", "acme"])
            .unwrap();

        let names: Vec<&String> = matches.get_many::<String>("name").unwrap().collect();
        assert_eq!(names, ["web", "api"]);
        assert_eq!(matches.get_one::<String>("org").map(String::as_str), Some("acme"));
    }

    #[test]
    fn test_required_flag_is_enforced() {
        let cmd = clap::Command::new("t").arg(project_flag("Use this project.", true).to_arg());
        assert!(cmd.try_get_matches_from(["t"]).is_err());
    }
}
