pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::{BackendKind, EnrichmentMode, TriageOptions};

#[derive(Debug, Parser)]
#[command(name = "triage")]
#[command(author, version, about = "Triage GitHub issues for a Kubernetes service repo", long_about = None)]
pub struct Cli {
    /// Repository as owner/name (defaults to the current directory's repo)
    #[arg(short, long, global = true)]
    pub repo: Option<String>,

    /// Path to a triage config JSON (defaults to the bundled config)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Classification backend
    #[arg(long, global = true, default_value = "mock")]
    pub backend: BackendArg,

    /// Enable documentation enrichment
    #[arg(long, global = true)]
    pub enrich: bool,

    /// Model to use for the live backend and enrichment
    #[arg(short, long, global = true, default_value = "sonnet")]
    pub model: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendArg {
    #[default]
    Mock,
    Live,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Mock => BackendKind::Mock,
            BackendArg::Live => BackendKind::Live,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify one issue and apply the result to the tracker
    Triage {
        /// Issue number
        number: u64,

        /// Print the result without touching the issue
        #[arg(long)]
        dry_run: bool,

        /// How many open issues to snapshot for duplicate detection
        #[arg(long, default_value = "200")]
        snapshot: usize,
    },

    /// Classify ad-hoc issue text without touching any tracker
    Classify {
        /// Issue title
        #[arg(short, long)]
        title: String,

        /// Issue body
        #[arg(short, long, default_value = "")]
        body: String,
    },

    /// Triage every open unclassified issue
    Sweep {
        /// Maximum concurrent classifications
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// How many open issues to fetch
        #[arg(long, default_value = "100")]
        limit: usize,

        /// Print results without touching any issue
        #[arg(long)]
        dry_run: bool,
    },
}

/// Translate global flags into construction-time options.
fn options(cli: &Cli) -> TriageOptions {
    TriageOptions {
        backend: cli.backend.into(),
        enrichment: if cli.enrich {
            EnrichmentMode::Enabled
        } else {
            EnrichmentMode::Disabled
        },
        model: cli.model.clone(),
    }
}

pub fn run(cli: Cli) -> Result<(), String> {
    let opts = options(&cli);
    match cli.command {
        Commands::Triage {
            number,
            dry_run,
            snapshot,
        } => commands::triage::run(
            cli.repo,
            cli.config.as_deref(),
            &opts,
            number,
            snapshot,
            dry_run,
            cli.format,
        ),
        Commands::Classify { title, body } => {
            commands::classify::run(cli.config.as_deref(), &opts, &title, &body, cli.format)
        }
        Commands::Sweep {
            concurrency,
            limit,
            dry_run,
        } => commands::sweep::run(
            cli.repo,
            cli.config.as_deref(),
            &opts,
            concurrency,
            limit,
            dry_run,
            cli.format,
        ),
    }
}
