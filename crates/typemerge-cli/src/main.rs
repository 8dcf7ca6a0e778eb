use anyhow::Context;
use clap::{Parser, Subcommand};
use merge_engine::{simple_merge, DefaultResolver, Resolver, Strictness, Value};
use std::path::{Path, PathBuf};
use typemerge_core::config::Settings;
use typemerge_core::logging::init_logging;

#[derive(Parser)]
#[command(
    name = "typemerge",
    about = "Merge JSON documents with type-driven merge rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a settings.json file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the pedantic engine regardless of settings
    #[arg(long, global = true)]
    pedantic: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two JSON documents and print the result
    Merge {
        /// First document (its values come first)
        left: PathBuf,
        /// Second document
        right: PathBuf,
    },
    /// Merge two JSON objects key by key
    DictMerge {
        left: PathBuf,
        right: PathBuf,
        /// Fail on any shared key instead of resolving it
        #[arg(long)]
        strict: bool,
    },
    /// Print the engine's type priority order
    Types,
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if cli.pedantic {
        settings.engine.mode = Strictness::Pedantic;
    }
    Ok(settings)
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(Value::from(json))
}

fn render(value: &Value) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&value.to_json())?)
}

fn print_value(value: &Value) -> anyhow::Result<()> {
    println!("{}", render(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let _guard = init_logging(&settings.logging)?;

    match &cli.command {
        Commands::Merge { left, right } => cmd_merge(&settings, left, right),
        Commands::DictMerge {
            left,
            right,
            strict,
        } => cmd_dict_merge(left, right, *strict),
        Commands::Types => cmd_types(&settings),
    }
}

fn cmd_merge(settings: &Settings, left: &Path, right: &Path) -> anyhow::Result<()> {
    let engine = settings.engine.build();
    let a = read_document(left)?;
    let b = read_document(right)?;

    tracing::info!(
        left = %left.display(),
        right = %right.display(),
        mode = %engine.strictness(),
        "merging documents"
    );
    let merged = engine
        .merge(&a, &b)
        .with_context(|| format!("failed to merge {} with {}", left.display(), right.display()))?;
    print_value(&merged)
}

fn cmd_dict_merge(left: &Path, right: &Path, strict: bool) -> anyhow::Result<()> {
    let a = read_document(left)?;
    let b = read_document(right)?;
    let resolver: Option<&dyn Resolver> = if strict {
        None
    } else {
        Some(&DefaultResolver)
    };

    tracing::info!(
        left = %left.display(),
        right = %right.display(),
        strict,
        "merging objects"
    );
    let merged = simple_merge(&a, &b, resolver)
        .with_context(|| format!("failed to merge {} with {}", left.display(), right.display()))?;
    print_value(&merged)
}

fn cmd_types(settings: &Settings) -> anyhow::Result<()> {
    let engine = settings.engine.build();
    println!("Mode: {}", engine.strictness());
    for (rank, label) in engine.list_types().iter().enumerate() {
        println!("  {}. {}", rank + 1, label);
    }
    if engine.strictness() == Strictness::Lenient {
        println!("  -  {} (fallback)", merge_engine::DEFAULT_LABEL);
    }
    Ok(())
}
