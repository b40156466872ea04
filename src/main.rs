use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use mcpack_versions::config::{self, KNOWN_MODULES, ResolverConfig, VANILLA_DATA_MODULE};
use mcpack_versions::version::resolver::VersionResolver;
use mcpack_versions::version::select::{latest_stable, manifest_dependency_version, min_engine_version};
use mcpack_versions::version::types::ResolveOptions;

#[derive(Parser)]
#[command(name = "mcpack-versions")]
#[command(version, about = "Resolve published versions of Minecraft script modules")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write JSON logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write logs to the default log file under the data directory
    #[arg(long, global = true, conflicts_with = "log_file")]
    log: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List versions of a module, newest first
    Resolve {
        module: String,

        /// List pre-release versions instead of stable ones
        #[arg(long)]
        prerelease: bool,
    },
    /// Print the latest stable version of each module
    Latest {
        #[arg(required = true)]
        modules: Vec<String>,
    },
    /// Print default dependency versions and min engine version for a new pack
    Defaults,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = cli.log_file.clone().or_else(|| cli.log.then(config::log_path));
    let _guard = mcpack_versions::logging::init(cli.verbose, log_file.as_deref())
        .context("Failed to open log file")?;

    let config = match &cli.config {
        Some(path) => ResolverConfig::from_file(path)?,
        None => ResolverConfig::default(),
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

async fn run(command: Command, config: ResolverConfig) -> anyhow::Result<()> {
    let resolver = VersionResolver::from_config(&config);

    match command {
        Command::Resolve { module, prerelease } => {
            let options = ResolveOptions {
                include_prerelease: prerelease,
            };
            let versions = resolver
                .resolve(&module, options)
                .await
                .with_context(|| format!("Failed to resolve versions of {}", module))?;

            for version in versions {
                println!("{}", version);
            }
        }
        Command::Latest { modules } => {
            let modules: Vec<&str> = modules.iter().map(String::as_str).collect();
            let results = resolver
                .resolve_many(&modules, ResolveOptions::default())
                .await;

            for (module, result) in modules.iter().zip(results) {
                let versions =
                    result.with_context(|| format!("Failed to resolve versions of {}", module))?;
                match latest_stable(&versions) {
                    Some(latest) => println!("{} {}", module, latest),
                    None => println!("{} (no stable release)", module),
                }
            }
        }
        Command::Defaults => {
            let results = resolver
                .resolve_many(KNOWN_MODULES, ResolveOptions::default())
                .await;

            for (module, result) in KNOWN_MODULES.iter().zip(results) {
                let versions =
                    result.with_context(|| format!("Failed to resolve versions of {}", module))?;
                let latest = latest_stable(&versions)
                    .with_context(|| format!("{} has no stable release", module))?;

                if *module == VANILLA_DATA_MODULE {
                    let [major, minor, patch] = min_engine_version(latest)
                        .with_context(|| format!("Unrecognized {} version {}", module, latest))?;
                    println!("min_engine_version [{}, {}, {}]", major, minor, patch);
                } else {
                    println!("{} {}", module, manifest_dependency_version(latest));
                }
            }
        }
    }

    Ok(())
}
