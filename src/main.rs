//! gamepub - package an HTML game into an EPUB

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gamepub::{ArchiveOptions, BuildConfig, BuildError, PackageMetadata, build, inspect};

const DEFAULT_SOURCE: &str = "game.html";
const DEFAULT_SHIM: &str = "shim.html";
const DEFAULT_OUTPUT: &str = "game.epub";

#[derive(Parser)]
#[command(name = "gamepub")]
#[command(version, about = "Package an HTML game into an EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    gamepub                                 Build game.html (+ shim.html) into game.epub
    gamepub -s eaglecraft.html -o out.epub  Build a specific payload
    gamepub --config build.json             Read settings from a JSON file
    gamepub --check out.epub                Check an existing container")]
struct Cli {
    /// HTML payload to package
    #[arg(short, long, value_name = "HTML")]
    source: Option<PathBuf>,

    /// File whose content is spliced after the payload's <head>
    #[arg(long, value_name = "FILE")]
    shim: Option<PathBuf>,

    /// Output EPUB path
    #[arg(short, long, value_name = "EPUB")]
    output: Option<PathBuf>,

    /// Book title (defaults to the payload file name)
    #[arg(long)]
    title: Option<String>,

    /// Book creator
    #[arg(long)]
    creator: Option<String>,

    /// Language tag
    #[arg(long)]
    language: Option<String>,

    /// JSON settings file; command-line flags take precedence
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Check an existing EPUB container instead of building
    #[arg(long, value_name = "EPUB")]
    check: Option<PathBuf>,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

/// Settings accepted from `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    source: Option<PathBuf>,
    shim: Option<PathBuf>,
    output: Option<PathBuf>,
    title: Option<String>,
    creator: Option<String>,
    language: Option<String>,
    subject: Option<String>,
    description: Option<String>,
    payload_filename: Option<String>,
    content_root: Option<String>,
    compression_level: Option<i64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    if let Some(ref path) = cli.check {
        return match check(path) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                println!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            println!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match build(&config) {
        Ok(path) => {
            if !cli.quiet {
                println!("EPUB created successfully: {}", path.display());
                match fs::metadata(&path) {
                    Ok(meta) => println!("File size: {:.2} MB", meta.len() as f64 / 1024.0 / 1024.0),
                    Err(e) => tracing::warn!(error = %e, "could not stat output"),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error creating EPUB: {e}");
            if let Some(hint) = failure_hint(&e, &config.source) {
                println!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "gamepub=warn" } else { "gamepub=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn resolve_config(cli: &Cli) -> Result<BuildConfig, String> {
    let file = match cli.config {
        Some(ref path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let source = cli
        .source
        .clone()
        .or(file.source)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE));
    let output = cli
        .output
        .clone()
        .or(file.output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let shim = match cli.shim.clone().or(file.shim) {
        Some(path) => fs::read_to_string(&path)
            .map_err(|e| format!("cannot read shim {}: {e}", path.display()))?,
        None => read_default_shim(Path::new(DEFAULT_SHIM))?,
    };

    let title = cli
        .title
        .clone()
        .or(file.title)
        .unwrap_or_else(|| title_from_source(&source));
    let mut metadata = PackageMetadata::new(title);
    if let Some(creator) = cli.creator.clone().or(file.creator) {
        metadata = metadata.with_creator(creator);
    }
    if let Some(language) = cli.language.clone().or(file.language) {
        metadata = metadata.with_language(language);
    }
    if let Some(subject) = file.subject {
        metadata = metadata.with_subject(subject);
    }
    if let Some(description) = file.description {
        metadata = metadata.with_description(description);
    }

    let mut config = BuildConfig::new(source, output, metadata).with_shim(shim);
    config.payload_filename = file.payload_filename;
    if let Some(root) = file.content_root {
        config.content_root = root;
    }
    config.archive = ArchiveOptions {
        compression_level: file.compression_level,
    };
    Ok(config)
}

fn load_file_config(path: &Path) -> Result<FileConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

/// The default shim file is optional; an absent file means no shim.
fn read_default_shim(path: &Path) -> Result<String, String> {
    match fs::read_to_string(path) {
        Ok(shim) => Ok(shim),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no shim file, packaging payload unmodified");
            Ok(String::new())
        }
        Err(e) => Err(format!("cannot read shim {}: {e}", path.display())),
    }
}

fn title_from_source(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn failure_hint(err: &BuildError, source: &Path) -> Option<String> {
    match err {
        BuildError::SourceNotFound(path) => Some(format!("Make sure {} exists.", path.display())),
        BuildError::EmptyPayload => Some(format!("{} has no content.", source.display())),
        _ => None,
    }
}

fn check(path: &Path) -> Result<bool, String> {
    let report = inspect(path).map_err(|e| e.to_string())?;

    println!("File: {}", path.display());
    for entry in &report.entries {
        let method = if entry.stored { "stored" } else { "deflated" };
        println!(
            "  {:<40} {:>9} {:>9}  {method}",
            entry.name, entry.size, entry.compressed_size
        );
    }

    let problems = report.check();
    if problems.is_empty() {
        println!("Container OK");
        Ok(true)
    } else {
        for problem in &problems {
            println!("problem: {problem}");
        }
        Ok(false)
    }
}
