//! worksheet CLI: the learner-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "worksheet",
    version,
    about = "Unit 2 English practice worksheet with an AI coach"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available exercises
    List {
        /// Extra exercise dataset file or directory
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Print an exercise: passage, instructions, example and items
    Show {
        /// Exercise id (see `worksheet list`)
        exercise: String,

        /// Extra exercise dataset file or directory
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Work through an exercise interactively
    Practice {
        /// Exercise id (see `worksheet list`)
        exercise: String,

        /// Extra exercise dataset file or directory
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Coach to ask for feedback (defaults to `default_coach`)
        #[arg(long)]
        coach: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a file of answers
    Check {
        /// Exercise id to grade
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        exercise: Option<String>,

        /// Grade every exercise
        #[arg(long)]
        all: bool,

        /// TOML file with an `[answers.<exercise>]` table per exercise
        #[arg(long)]
        answers: PathBuf,

        /// Ask this coach for feedback on each exercise
        #[arg(long)]
        coach: Option<String>,

        /// Output format: text, json, html, all
        #[arg(long, default_value = "text")]
        format: String,

        /// Output directory for json/html reports
        #[arg(long, default_value = "./worksheet-results")]
        output: PathBuf,

        /// Extra exercise dataset file or directory
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate built-in or external exercise datasets
    Validate {
        /// Dataset file or directory (built-in exercises when omitted)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Create a starter config and example dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("worksheet=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { dataset } => commands::list::execute(dataset),
        Commands::Show { exercise, dataset } => commands::show::execute(exercise, dataset),
        Commands::Practice {
            exercise,
            dataset,
            coach,
            config,
        } => commands::practice::execute(exercise, dataset, coach, config).await,
        Commands::Check {
            exercise,
            all,
            answers,
            coach,
            format,
            output,
            dataset,
            config,
        } => {
            commands::check::execute(commands::check::CheckArgs {
                exercise,
                all,
                answers,
                coach,
                format,
                output,
                dataset,
                config,
            })
            .await
        }
        Commands::Validate { dataset } => commands::validate::execute(dataset),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
