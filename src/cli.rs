use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "grafana-connect",
    version,
    about = "Context-aware Grafana launcher: detects your K8s context and opens the matching dashboard."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub launch: LaunchArgs,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}

#[derive(Debug, Clone, Default, Args)]
pub struct LaunchArgs {
    /// Launch a specific environment by its alias
    #[arg(short = 'e', long = "env", value_name = "ALIAS")]
    pub alias: Option<String>,

    /// Pick the environment and namespace interactively
    #[arg(short = 'I', long)]
    pub interactive: bool,

    /// Pick only the namespace interactively; the environment comes from the current context
    #[arg(short = 'i', long)]
    pub interactive_namespace: bool,

    /// Override the namespace used in the dashboard filters
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fuzzy-search for an environment and open its dashboard
    List {
        /// Override the namespace used in the dashboard filters
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
    /// View or modify the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print candidate values for shell completion
    #[command(hide = true)]
    Completions {
        #[arg(value_enum)]
        target: CompletionTarget,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Display the current configuration with passwords masked
    Get,
    /// Interactively add or update environment entries
    Update,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionTarget {
    /// Environment aliases accepted by --env
    Aliases,
    /// Live namespaces of the current cluster
    Namespaces,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    Alias(String),
    Interactive,
    InteractiveNamespace,
    Auto,
}

impl LaunchArgs {
    pub fn selection_mode(&self) -> SelectionMode {
        if let Some(alias) = &self.alias {
            return SelectionMode::Alias(alias.clone());
        }
        if self.interactive {
            return SelectionMode::Interactive;
        }
        if self.interactive_namespace {
            return SelectionMode::InteractiveNamespace;
        }
        SelectionMode::Auto
    }

    pub fn apply_namespace_override(&self, resolved: String) -> String {
        self.namespace.clone().unwrap_or(resolved)
    }
}
