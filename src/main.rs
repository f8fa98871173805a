//! Command-line entry point for resolving stylesheet asset URLs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use css_asset_paths::{AssetKind, AssetPathResolver, AssetReference, BuildConfig};

/// Resolve stylesheet asset references to relative or site-rooted URLs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Configuration file (default: discovered in the current directory)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and print the effective settings as JSON
    Check,

    /// Print the URL each asset resolves to
    Resolve {
        /// Path the compiled stylesheet will be written to, relative to the current directory
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        css: PathBuf,

        /// Treat asset paths as relative to this kind's directory
        #[arg(short, long)]
        kind: Option<AssetKind>,

        /// Asset paths to resolve, relative to the current directory unless `--kind` is given
        #[arg(required = true)]
        assets: Vec<PathBuf>,
    },

    /// Replace `image-url(...)`-style helpers in a compiled stylesheet
    Rewrite {
        /// Compiled stylesheet to rewrite
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Write the result here instead of rewriting in place
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: u8) {
    use env_logger::{Builder, Env};

    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Check => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Resolve { css, kind, assets } => {
            let css = from_current_dir(&css)?;
            let references = assets
                .into_iter()
                .map(|path| match kind {
                    Some(kind) => Ok(AssetReference::scoped(kind, path)),
                    None => from_current_dir(&path).map(AssetReference::new),
                })
                .collect::<Result<Vec<_>>>()?;

            let resolver = AssetPathResolver::new(&config);
            let results = resolver.resolve_all(&references, &css);
            let mut failed = false;
            for (reference, result) in references.iter().zip(results) {
                match result {
                    Ok(url) => println!("{url}"),
                    Err(err) => {
                        failed = true;
                        log::error!("{reference}: {err}");
                    }
                }
            }

            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Command::Rewrite { input, output } => {
            let output = output.unwrap_or_else(|| input.clone());
            let count = css_asset_paths::rewrite_stylesheet_file(&config, &input, &output)?;
            println!("{count} asset helper(s) rewritten in {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn from_current_dir(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("failed to resolve {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<BuildConfig> {
    match path {
        Some(path) => BuildConfig::from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("failed to determine the current directory")?;
            BuildConfig::discover(&cwd).context("failed to discover configuration")
        }
    }
}
