use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::debug;

use modcache::cache::{ArtifactOutcome, RepositoryCache};
use modcache::config::{self, CacheConfig};
use modcache::logging;
use modcache::module::{Artifact, DependencyDescriptor, ModuleId, ModuleRevisionId};
use modcache::resolver::{LocalStoreResolver, ResolutionSession};
use modcache::version::matchers::ChainVersionMatcher;

#[derive(Parser)]
#[command(name = "modcache")]
#[command(version, about = "Inspect and query a module resolution cache")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache root, overriding the configuration
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List organisations, modules of an organisation, or revisions of a module
    List {
        organisation: Option<String>,
        module: Option<String>,
    },
    /// Look up what the cache knows for a requested revision
    Find {
        organisation: String,
        module: String,
        revision: String,
        #[arg(long)]
        branch: Option<String>,
        /// Resolver whose resolved-revision mappings are consulted
        #[arg(long)]
        resolver: Option<String>,
        /// Treat entries older than their TTL as absent
        #[arg(long)]
        check_ttl: bool,
    },
    /// Print the recorded origin of an artifact
    Origin {
        organisation: String,
        module: String,
        revision: String,
        name: String,
        #[arg(value_name = "TYPE")]
        artifact_type: String,
        ext: String,
    },
    /// Check which declared artifacts of a cached revision are present
    Check {
        organisation: String,
        module: String,
        revision: String,
    },
}

fn load(cli: &Cli) -> anyhow::Result<CacheConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => CacheConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    debug!("Configuration: {:?}", config);
    Ok(config)
}

fn mrid(organisation: &str, module: &str, revision: &str) -> ModuleRevisionId {
    ModuleRevisionId::new(ModuleId::new(organisation, module), revision)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load(&cli)?;
    let cache = Arc::new(RepositoryCache::from_config(&config));
    let store = LocalStoreResolver::new(cache.clone(), Arc::new(ChainVersionMatcher::default()));

    match cli.command {
        Command::List {
            organisation: None, ..
        } => {
            for entry in store.list_organisations()? {
                println!("{}", entry);
            }
        }
        Command::List {
            organisation: Some(organisation),
            module: None,
        } => {
            for entry in store.list_modules(&organisation)? {
                println!("{}", entry);
            }
        }
        Command::List {
            organisation: Some(organisation),
            module: Some(module),
        } => {
            for entry in store.list_revisions(&ModuleId::new(organisation, module))? {
                println!("{}", entry);
            }
        }
        Command::Find {
            organisation,
            module,
            revision,
            branch,
            resolver,
            check_ttl,
        } => {
            let mut id = mrid(&organisation, &module, &revision);
            if let Some(branch) = branch {
                id = id.with_branch(branch);
            }
            let mut options = config.to_options().with_check_ttl(check_ttl);
            if let Some(resolver) = resolver {
                options = options.with_resolver_name(resolver);
            }

            match store.get_dependency(&DependencyDescriptor::new(id.clone()), &options, &ResolutionSession::new()) {
                Ok(Some(found)) => {
                    let resolved = found.revision();
                    println!(
                        "{} -> {} (status {}, resolved by {} at {})",
                        id,
                        resolved.id(),
                        resolved.descriptor().status,
                        resolved.resolver_name(),
                        resolved.resolved_at()
                    );
                }
                Ok(None) => println!("{} not found in cache", id),
                Err(e) if e.is_inconsistent() => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Origin {
            organisation,
            module,
            revision,
            name,
            artifact_type,
            ext,
        } => {
            let artifact = Artifact::new(
                mrid(&organisation, &module, &revision),
                name,
                artifact_type,
                ext,
                Utc::now(),
            );
            let origin = cache.get_origin(&artifact)?;
            match origin.location() {
                Some(location) => println!(
                    "{} {} ({})",
                    artifact,
                    location,
                    if origin.is_local() == Some(true) { "local" } else { "remote" }
                ),
                None => println!("{} origin unknown", artifact),
            }
        }
        Command::Check {
            organisation,
            module,
            revision,
        } => {
            let id = mrid(&organisation, &module, &revision);
            let options = config.to_options().with_check_ttl(false);
            let resolved = cache
                .find_module_in_cache(&id, &options)?
                .with_context(|| format!("{} is not cached", id))?;

            let report = store.download(&resolved.descriptor().all_artifacts())?;
            for entry in report.iter() {
                match &entry.outcome {
                    ArtifactOutcome::Satisfied { local_file, size } => {
                        println!("{} ok {} bytes {}", entry.artifact, size, local_file.display())
                    }
                    ArtifactOutcome::Failed(reason) => println!("{} failed {:?}", entry.artifact, reason),
                }
            }
            if report.has_failures() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.verbose, Some(&config::log_path()))?;
    run(cli)
}
