//! Load config, build the loop, and solve one problem.

use std::path::PathBuf;
use std::sync::Arc;

use thoughtloop_agent::{
    DEFAULT_TEMPLATE, ReactLoop, TraceEntry, TraceKind, load_template, render_system_prompt,
};
use thoughtloop_config::AppConfig;
use thoughtloop_core::message::Transcript;
use tracing::info;

pub struct Options {
    pub problem: String,
    pub max_turns: Option<u32>,
    pub model: Option<String>,
    pub config: Option<PathBuf>,
    pub system_prompt: Option<PathBuf>,
    pub verbose: bool,
}

pub async fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &options.config {
        Some(path) => AppConfig::load_with_overrides(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(model) = options.model {
        config.model = model;
    }
    if let Some(max_turns) = options.max_turns {
        config.max_turns = max_turns;
    }
    if let Some(path) = options.system_prompt {
        config.system_prompt_path = Some(path);
    }
    config.validate()?;

    // Check for API key early; give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export ANTHROPIC_API_KEY='sk-ant-...'");
        eprintln!("    export THOUGHTLOOP_API_KEY='sk-ant-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = thoughtloop_providers::build_from_config(&config)?;
    let settings = thoughtloop_providers::generation_settings(&config);
    let tools = Arc::new(thoughtloop_tools::default_registry());

    let template = match &config.system_prompt_path {
        Some(path) => load_template(path)?,
        None => DEFAULT_TEMPLATE.to_string(),
    };
    let transcript = Transcript::from_prompt(render_system_prompt(&template, &tools), options.problem);

    print_transcript(&transcript);
    println!("\n\nStarting ReAct loop...\n\n");

    let react = ReactLoop::new(provider, settings, tools).with_max_turns(config.max_turns);
    let outcome = react.run_with_observer(transcript, print_entry).await?;

    info!(
        turns = outcome.turns,
        finished = outcome.finished,
        "Run complete"
    );
    if options.verbose {
        eprintln!("\n{}", thoughtloop_agent::trace::render(&outcome.trace));
    }
    println!("\n\n{}\n\n", outcome.answer);
    Ok(())
}

fn print_transcript(transcript: &Transcript) {
    for message in transcript.messages() {
        println!("{}:", message.role.as_str().to_uppercase());
        println!(" {}", message.joined_text());
    }
}

fn print_entry(entry: &TraceEntry) {
    // The answer is printed once the loop returns
    if entry.kind != TraceKind::FinalAnswer {
        print!("{}", entry.content);
    }
}
