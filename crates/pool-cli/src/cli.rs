//! Command-line argument parsing with clap.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::RegistryConfig;

/// poolctl - manage pools held by a pool registry.
#[derive(Parser, Debug, Clone)]
#[command(name = "poolctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Registry to talk to: `ws://` / `wss://` for a remote registry,
    /// `file://<path>` for a local state file.
    #[arg(short, long, env = "POOLCTL_REGISTRY", default_value = "ws://localhost:8080")]
    pub registry: String,

    /// Output format.
    #[arg(short, long, value_enum, env = "POOLCTL_FORMAT", default_value_t = Format::Table)]
    pub format: Format,

    /// Seconds to wait for the registry connection.
    #[arg(long, env = "POOLCTL_CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout: u64,

    /// Seconds to wait for each registry response.
    #[arg(long, env = "POOLCTL_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Registry settings resolved from the parsed flags.
    #[must_use]
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            url: self.registry.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Pool subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Display all pools.
    List,

    /// Display one pool by name.
    Get {
        /// Pool name.
        name: String,
    },

    /// Create a pool, or update it if the name already exists.
    Set {
        /// Pool name.
        name: String,
        /// Slot capacity (non-negative integer).
        slots: String,
        /// Pool description.
        description: String,
    },

    /// Delete a pool by name.
    Delete {
        /// Pool name.
        name: String,
    },

    /// Import pools from a JSON file.
    ///
    /// Example file format:
    ///
    /// ```text
    /// {
    ///     "pool_1": {"slots": 5, "description": ""},
    ///     "pool_2": {"slots": 10, "description": "test"}
    /// }
    /// ```
    #[command(verbatim_doc_comment)]
    Import {
        /// Path of the pools file.
        filepath: String,
    },

    /// Export all pools to a JSON file.
    Export {
        /// Path of the file to write.
        filepath: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parse_list_command() {
        let cli = Cli::parse_from(["poolctl", "list"]);
        assert_eq!(cli.command, Commands::List);
        assert_eq!(cli.format, Format::Table);
    }

    #[test]
    fn parse_list_json() {
        let cli = Cli::parse_from(["poolctl", "--format", "json", "list"]);
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn parse_set_command() {
        let cli = Cli::parse_from(["poolctl", "set", "foo", "1", "test"]);
        assert_eq!(
            cli.command,
            Commands::Set {
                name: "foo".into(),
                slots: "1".into(),
                description: "test".into(),
            }
        );
    }

    // Slots stay raw text so the registry rules decide what is valid.
    #[test]
    fn parse_set_keeps_raw_slots() {
        let cli = Cli::parse_from(["poolctl", "set", "foo", "many", ""]);
        assert_eq!(
            cli.command,
            Commands::Set {
                name: "foo".into(),
                slots: "many".into(),
                description: String::new(),
            }
        );
    }

    #[test]
    fn parse_import_and_export() {
        let cli = Cli::parse_from(["poolctl", "import", "pools.json"]);
        assert_eq!(cli.command, Commands::Import { filepath: "pools.json".into() });

        let cli = Cli::parse_from(["poolctl", "export", "out.json"]);
        assert_eq!(cli.command, Commands::Export { filepath: "out.json".into() });
    }

    #[test]
    fn parse_registry_flag() {
        let cli = Cli::parse_from(["poolctl", "-r", "file:///tmp/pools.json", "get", "foo"]);
        assert_eq!(cli.registry, "file:///tmp/pools.json");
        assert_eq!(cli.command, Commands::Get { name: "foo".into() });
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["poolctl", "delete", "foo", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn registry_config_from_flags() {
        let cli = Cli::parse_from([
            "poolctl",
            "--connect-timeout",
            "3",
            "--request-timeout",
            "7",
            "list",
        ]);
        let config = cli.registry_config();
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(7));
    }

    #[test]
    fn import_help_shows_file_format() {
        let mut cmd = Cli::command();
        let import = cmd.find_subcommand_mut("import").expect("import subcommand");
        let help = import.render_long_help().to_string();
        assert!(help.contains(r#""pool_1": {"slots": 5, "description": ""}"#));
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["poolctl"]).is_err());
    }
}
