//! thoughtloop CLI: the main entry point.
//!
//! Solves one problem with the ReAct loop and prints every Thoughts,
//! Action, and Observation block as it is produced, then the answer.

use std::path::PathBuf;

use clap::Parser;

mod solve;

#[derive(Parser)]
#[command(
    name = "thoughtloop",
    about = "thoughtloop: XML-tagged ReAct agent",
    version,
    author
)]
struct Cli {
    /// The problem statement sent as the first user message
    #[arg(short, long, default_value = "Solve: 5 * 3 ^ 2 + 2 ^ 3 - 1")]
    problem: String,

    /// Maximum Thoughts/Action/Observation cycles
    #[arg(long)]
    max_turns: Option<u32>,

    /// Override the configured model
    #[arg(short, long)]
    model: Option<String>,

    /// Path to a config file (default: ~/.thoughtloop/config.toml)
    #[arg(short, long, env = "THOUGHTLOOP_CONFIG")]
    config: Option<PathBuf>,

    /// Replacement system prompt template containing a {tools} placeholder
    #[arg(long)]
    system_prompt: Option<PathBuf>,

    /// Print a starter config file and exit
    #[arg(long)]
    init_config: bool,

    /// Enable verbose logging and print the reasoning trace at the end
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.init_config {
        print!("{}", thoughtloop_config::AppConfig::default_toml());
        return Ok(());
    }

    // Initialize tracing; stdout is reserved for the transcript
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    solve::run(solve::Options {
        problem: cli.problem,
        max_turns: cli.max_turns,
        model: cli.model,
        config: cli.config,
        system_prompt: cli.system_prompt,
        verbose: cli.verbose,
    })
    .await
}
