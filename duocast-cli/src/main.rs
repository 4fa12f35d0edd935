//! Duocast CLI - two-host podcasts from book summaries
//!
//! A command-line interface for every stage of the duocast pipeline.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use duocast::config::{ConfigError, IssueLevel, config_path, init_config, load_config_from};
use duocast::corpus::{combine_text_files, read_text_dir};
use duocast::pipeline::{build_assembler, build_parser};
use duocast::prelude::*;
use duocast::topics::{
    TopicSelection, extract_core_topics, generate_core_topics, load_topics, save_topics,
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Duocast - turn book summaries into a two-host podcast
#[derive(Parser)]
#[command(name = "duocast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "DUOCAST_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Load environment variables from this file instead of `./.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize books into one text
    Summarize(SummarizeArgs),

    /// Generate core topics from summaries
    Topics(TopicsArgs),

    /// Write a name-tagged script for one topic
    Script(ScriptArgs),

    /// Write an emotion-tagged transcript covering all topics
    Transcript(TranscriptArgs),

    /// Parse a transcript and print its segments
    Parse(ParseArgs),

    /// Render a transcript to audio
    Synthesize(SynthesizeArgs),

    /// Merge the .txt files of a directory into one file
    Combine(CombineArgs),

    /// Run the whole pipeline: topics, transcript and audio
    Create(CreateArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the summarize command
#[derive(Args)]
struct SummarizeArgs {
    /// Source documents (.txt, .md, or .pdf with the `pdf` feature)
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "summaries/summary.txt")]
    output: PathBuf,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,
}

/// Arguments for the topics command
#[derive(Args)]
struct TopicsArgs {
    /// Directory of summary .txt files
    #[arg(short, long, default_value = "summaries")]
    summary_dir: PathBuf,

    /// Podcast theme; without it the model picks the topics itself
    #[arg(short, long)]
    theme: Option<String>,

    /// Expected duration in minutes (with --theme)
    #[arg(short, long)]
    duration: Option<u32>,

    /// Output file; invalid JSON is saved beside it as .txt
    #[arg(short, long, default_value = "output/core_topics.json")]
    output: PathBuf,
}

/// Arguments for the script command
#[derive(Args)]
struct ScriptArgs {
    /// Directory of summary .txt files
    #[arg(short, long, default_value = "summaries")]
    summary_dir: PathBuf,

    /// Core topics file
    #[arg(short, long, default_value = "output/core_topics.json")]
    topics: PathBuf,

    /// Zero-based topic index; random when omitted
    #[arg(short = 'i', long)]
    topic: Option<usize>,

    /// Duration in minutes
    #[arg(short, long)]
    duration: Option<u32>,

    /// Output file
    #[arg(short, long, default_value = "output/podcast_script.txt")]
    output: PathBuf,
}

/// Arguments for the transcript command
#[derive(Args)]
struct TranscriptArgs {
    /// Directory of summary .txt files
    #[arg(short, long, default_value = "summaries")]
    summary_dir: PathBuf,

    /// Core topics file, JSON or raw text
    #[arg(short, long, default_value = "output/core_topics.json")]
    topics: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "output/transcript.txt")]
    output: PathBuf,
}

/// Arguments for the parse command
#[derive(Args)]
struct ParseArgs {
    /// Transcript file
    input: PathBuf,

    /// Reject unattributable lines instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Print segments as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the synthesize command
#[derive(Args)]
struct SynthesizeArgs {
    /// Transcript file
    input: PathBuf,

    /// Output WAV file
    #[arg(short, long, default_value = "output/podcast.wav")]
    output: PathBuf,

    /// Reject unattributable lines instead of skipping them
    #[arg(long)]
    strict: bool,
}

/// Arguments for the combine command
#[derive(Args)]
struct CombineArgs {
    /// Directory of .txt files
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "combined.txt")]
    output: PathBuf,
}

/// Arguments for the create command
#[derive(Args)]
struct CreateArgs {
    /// Podcast theme; without it the model picks the topics itself
    #[arg(short, long)]
    theme: Option<String>,

    /// Directory of summary .txt files
    #[arg(short, long, default_value = "summaries")]
    summary_dir: PathBuf,

    /// Expected duration in minutes (with --theme)
    #[arg(short, long)]
    duration: Option<u32>,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Stop after writing the transcript
    #[arg(long)]
    no_audio: bool,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration with secrets masked
    Show,
    /// Show configuration file path
    Path,
    /// Write a default configuration file
    Init,
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    load_env_file(cli.env_file.as_deref());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "duocast={level},duocast_cli={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

fn load_env_file(path: Option<&Path>) {
    match path {
        Some(path) => {
            if let Err(e) = dotenvy::from_path(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to load env file");
            }
        }
        None => {
            if let Ok(path) = dotenvy::dotenv() {
                tracing::debug!(path = %path.display(), "loaded .env");
            }
        }
    }
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.unwrap_or_else(config_path);

    match cli.command {
        Commands::Summarize(args) => cmd_summarize(args, &config_file).await,
        Commands::Topics(args) => cmd_topics(args, &config_file).await,
        Commands::Script(args) => cmd_script(args, &config_file).await,
        Commands::Transcript(args) => cmd_transcript(args, &config_file).await,
        Commands::Parse(args) => cmd_parse(args, &config_file).await,
        Commands::Synthesize(args) => cmd_synthesize(args, &config_file).await,
        Commands::Combine(args) => cmd_combine(args).await,
        Commands::Create(args) => cmd_create(args, &config_file).await,
        Commands::Config(args) => cmd_config(args, &config_file).await,
    }
}

/// Load the configuration file (defaults if absent) with the environment
/// merged in.
async fn load(config_file: &Path) -> Result<DuocastConfig> {
    Ok(load_config_from(config_file).await?.with_env())
}

async fn pipeline(config_file: &Path) -> Result<Pipeline> {
    Pipeline::from_config(load(config_file).await?).await
}

async fn cmd_summarize(args: SummarizeArgs, config_file: &Path) -> Result<()> {
    let pipeline = pipeline(config_file).await?;
    let mut summarizer = pipeline.summarizer();
    if let Some(model) = args.model {
        summarizer = summarizer.with_model(model);
    }

    let summary = summarizer
        .summarize_documents(&args.sources, &args.output)
        .await?;
    println!(
        "Summary written to {} ({} characters)",
        args.output.display(),
        summary.chars().count()
    );
    Ok(())
}

async fn cmd_topics(args: TopicsArgs, config_file: &Path) -> Result<()> {
    let pipeline = pipeline(config_file).await?;
    let summary = read_text_dir(&args.summary_dir).await?;
    let chat = pipeline.chat().as_ref();

    let raw = match args.theme.as_deref() {
        Some(theme) => {
            let minutes = args
                .duration
                .unwrap_or(pipeline.config().podcast.default_duration_minutes);
            generate_core_topics(chat, pipeline.topics_model(), theme, &summary, minutes).await?
        }
        None => extract_core_topics(chat, pipeline.topics_model(), &summary).await?,
    };

    let saved = save_topics(&raw, &args.output).await?;
    println!("Core topics written to {}", saved.path().display());
    Ok(())
}

async fn cmd_script(args: ScriptArgs, config_file: &Path) -> Result<()> {
    let pipeline = pipeline(config_file).await?;
    let summary = read_text_dir(&args.summary_dir).await?;
    let topics = load_topics(&args.topics).await?;

    let selection = args.topic.map_or(TopicSelection::Random, TopicSelection::Index);
    let topic = topics.select(selection)?;
    let minutes = args
        .duration
        .unwrap_or(pipeline.config().podcast.default_duration_minutes);

    let script = pipeline
        .writer()
        .write_topic_script(&summary, topic, pipeline.hosts(), minutes)
        .await?;
    write_output(&args.output, &script).await?;

    println!("Script on \"{}\" written to {}", topic.topic, args.output.display());
    Ok(())
}

async fn cmd_transcript(args: TranscriptArgs, config_file: &Path) -> Result<()> {
    let pipeline = pipeline(config_file).await?;
    let summary = read_text_dir(&args.summary_dir).await?;
    let topics = read_topics_text(&args.topics).await?;

    let transcript = pipeline
        .writer()
        .write_transcript(&summary, &topics, pipeline.hosts())
        .await?;
    write_output(&args.output, &transcript).await?;

    println!("Transcript written to {}", args.output.display());
    Ok(())
}

async fn cmd_parse(args: ParseArgs, config_file: &Path) -> Result<()> {
    let mut config = load(config_file).await?;
    if args.strict {
        config.transcript.mode = ParseMode::Strict;
    }
    let hosts = HostProfiles::load_or_default(config.podcast.hosts_file.as_deref()).await?;
    let text = tokio::fs::read_to_string(&args.input).await?;
    let segments = build_parser(&config, &hosts)?.parse(&text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    for segment in &segments {
        match segment.emotion() {
            Some(emotion) => println!("{} [{emotion}]: {}", segment.speaker(), segment.text()),
            None => println!("{}: {}", segment.speaker(), segment.text()),
        }
    }
    println!();
    println!("{} segments", segments.len());
    Ok(())
}

async fn cmd_synthesize(args: SynthesizeArgs, config_file: &Path) -> Result<()> {
    let mut config = load(config_file).await?;
    if args.strict {
        config.transcript.mode = ParseMode::Strict;
    }
    let hosts = HostProfiles::load_or_default(config.podcast.hosts_file.as_deref()).await?;
    let text = tokio::fs::read_to_string(&args.input).await?;
    let segments = build_parser(&config, &hosts)?.parse(&text)?;

    let speech: SharedSpeechProvider =
        Arc::new(ElevenLabs::new(ElevenLabsConfig::from(&config.speech))?);
    let report = build_assembler(&config, speech)?
        .assemble(&segments, &args.output)
        .await?;

    println!(
        "Audio written to {} ({} segments, {:.1}s)",
        report.output.display(),
        report.segments,
        report.duration_secs()
    );
    Ok(())
}

async fn cmd_combine(args: CombineArgs) -> Result<()> {
    let count = combine_text_files(&args.dir, &args.output).await?;
    if count > 0 {
        println!("Combined {count} files into {}", args.output.display());
    } else {
        println!("No .txt files found in {}", args.dir.display());
    }
    Ok(())
}

async fn cmd_create(args: CreateArgs, config_file: &Path) -> Result<()> {
    let pipeline = pipeline(config_file).await?;
    let artifacts = pipeline
        .create_podcast(
            args.theme.as_deref(),
            &args.summary_dir,
            args.duration,
            &args.output_dir,
            !args.no_audio,
        )
        .await?;

    println!("Core topics: {}", artifacts.topics.path().display());
    println!("Transcript:  {}", artifacts.transcript.display());
    if let Some(audio) = artifacts.audio {
        println!(
            "Audio:       {} ({} segments, {:.1}s)",
            audio.output.display(),
            audio.segments,
            audio.duration_secs()
        );
    }
    Ok(())
}

async fn cmd_config(args: ConfigArgs, config_file: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let mut config = load(config_file).await?;
            config.llm.api_key = config.llm.api_key.as_deref().map(mask);
            config.speech.api_key = config.speech.api_key.as_deref().map(mask);
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Path => {
            println!("{}", config_file.display());
            if !config_file.exists() {
                println!("(not created yet; run 'duocast config init')");
            }
        }
        ConfigCommands::Init => {
            if config_file.exists() {
                println!("Configuration already exists at: {}", config_file.display());
                return Ok(());
            }
            init_config(config_file).await?;
            println!("Configuration created: {}", config_file.display());
            println!();
            println!("Next steps:");
            println!("  1. export OPENROUTER_API_KEY=<key>");
            println!("  2. export ELEVENLABS_API_KEY=<key>");
            println!("  3. set speech.voice_a and speech.voice_b");
        }
        ConfigCommands::Validate => {
            let config = load(config_file).await?;
            let issues = config.validate();
            for issue in &issues {
                println!("{issue}");
            }
            let errors = issues
                .iter()
                .filter(|issue| issue.level == IssueLevel::Error)
                .count();
            if errors > 0 {
                return Err(
                    ConfigError::InvalidValue(format!("{errors} configuration error(s)")).into(),
                );
            }
            println!("Configuration is valid");
        }
    }

    Ok(())
}

/// Topics as raw text, falling back to the `.txt` sibling written for
/// non-JSON model output.
async fn read_topics_text(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) => {
            let txt = path.with_extension("txt");
            if txt.as_path() != path && txt.exists() {
                Ok(tokio::fs::read_to_string(&txt).await?)
            } else {
                Err(e.into())
            }
        }
    }
}

async fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}****")
}
