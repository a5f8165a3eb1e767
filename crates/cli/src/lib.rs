use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

mod command;

use retrieval_vector_store::DEFAULT_STUB_DIMENSION;

/// Write one line to stdout, treating a closed pipe as success
pub(crate) fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "retrieval")]
#[command(about = "Dense passage retrieval over Wikipedia-style corpora", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a corpus and write index, id and embedding artifacts
    Build(BuildArgs),

    /// Query previously built artifacts
    Search(SearchArgs),

    /// Show what an artifact directory holds
    Inspect(InspectArgs),
}

#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Corpus file, dump directory or shard tree
    #[arg(long)]
    pub corpus: PathBuf,

    /// Artifact output directory
    #[arg(long)]
    pub out: PathBuf,

    /// TOML build configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Texts per embedder call (overrides config and RETRIEVAL_CHUNK_SIZE)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Artifact file name prefix (overrides config and RETRIEVAL_ARTIFACT_PREFIX)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Also read .gz shards
    #[arg(long)]
    pub gzip: bool,

    /// Stub embedding dimension
    #[arg(long, default_value_t = DEFAULT_STUB_DIMENSION)]
    pub dim: usize,

    /// Print stats as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Artifact directory
    #[arg(long)]
    pub artifacts: PathBuf,

    #[arg(long)]
    pub prefix: Option<String>,

    /// Query text
    #[arg(long)]
    pub query: String,

    /// Number of results
    #[arg(short, long, default_value_t = 5)]
    pub k: usize,

    /// Stub embedding dimension (defaults to the index dimension)
    #[arg(long)]
    pub dim: Option<usize>,

    /// Corpus to look titles up in
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// TOML build configuration used to read the corpus
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also read .gz shards when looking titles up
    #[arg(long)]
    pub gzip: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub(crate) struct InspectArgs {
    /// Artifact directory
    #[arg(long)]
    pub artifacts: PathBuf,

    #[arg(long)]
    pub prefix: Option<String>,

    /// Ids to list
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    #[arg(long)]
    pub json: bool,
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Self::Build(args) => args.json,
            Self::Search(args) => args.json,
            Self::Inspect(args) => args.json,
        }
    }
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    // stdout is reserved for JSON in --json mode
    if cli.quiet || cli.command.json() {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Build(args) => command::build::run(args).await,
        Commands::Search(args) => command::search::run(args).await,
        Commands::Inspect(args) => command::inspect::run(args).await,
    }
}
