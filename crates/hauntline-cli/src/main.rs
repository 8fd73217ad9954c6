mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hauntline_engine::{RunOptions, Stage};

#[derive(Parser)]
#[command(
    name = "hauntline",
    version,
    about = "Runs the haunted places analysis pipeline: convert, break, similarity, clustering, visualization"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

/// Where the pipeline file and the working directory are.
#[derive(Args)]
struct LocationArgs {
    /// Path to pipeline YAML file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Working directory all artifact paths and stage commands resolve against
    #[arg(long)]
    workdir: Option<PathBuf>,
}

#[derive(Args)]
struct StageArgs {
    #[command(flatten)]
    location: LocationArgs,
    /// Path to the TSV dataset file (relative to the current directory)
    #[arg(long)]
    tsv_file: Option<PathBuf>,
    /// Skip TSV to JSON conversion (requires the record collection to exist)
    #[arg(long)]
    skip_convert: bool,
    /// Skip breaking JSON into fragment files (requires the fragments to exist)
    #[arg(long)]
    skip_break: bool,
    /// Skip similarity analysis (requires similarity results to exist)
    #[arg(long)]
    skip_similarity: bool,
    /// Skip clustering (requires cluster results to exist)
    #[arg(long)]
    skip_clustering: bool,
    /// Skip starting the visualization server
    #[arg(long)]
    skip_visualization: bool,
}

impl StageArgs {
    fn to_options(&self, fresh: bool) -> anyhow::Result<RunOptions> {
        let flags = [
            (Stage::Convert, self.skip_convert),
            (Stage::Break, self.skip_break),
            (Stage::Similarity, self.skip_similarity),
            (Stage::Clustering, self.skip_clustering),
            (Stage::Visualization, self.skip_visualization),
        ];
        // Relative to the invoking shell, not the workdir
        let source = self
            .tsv_file
            .as_deref()
            .map(|path| {
                std::path::absolute(path)
                    .with_context(|| format!("Invalid --tsv-file path: {}", path.display()))
            })
            .transpose()?;
        Ok(RunOptions {
            source,
            workdir: self.location.workdir.clone(),
            skip: flags
                .into_iter()
                .filter_map(|(stage, skip)| skip.then_some(stage))
                .collect(),
            fresh,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline
    Run {
        #[command(flatten)]
        stages: StageArgs,
        /// Remove the outputs of stages that will run before starting
        #[arg(long)]
        fresh: bool,
    },
    /// Validate configuration and report which stages could run
    Check {
        #[command(flatten)]
        stages: StageArgs,
    },
    /// Remove every stage output (the source table is kept)
    Clean {
        #[command(flatten)]
        location: LocationArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run { stages, fresh } => {
            commands::run::execute(stages.location.config.as_deref(), &stages.to_options(fresh)?)
                .await
        }
        Commands::Check { stages } => {
            commands::check::execute(stages.location.config.as_deref(), &stages.to_options(false)?)
        }
        Commands::Clean { location } => commands::clean::execute(
            location.config.as_deref(),
            &RunOptions {
                workdir: location.workdir,
                ..RunOptions::default()
            },
        ),
    }
}
