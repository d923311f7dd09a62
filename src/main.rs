// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::indexing_slicing
    )
)]

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use notebridge::logging::{get_log_file_path, init_logging, parse_rotation, LogConfig};
use notebridge::provider::{ItemKind, ISSUES_TYPE_KEY, PRS_TYPE_KEY, REPO_KEY};
use notebridge::utils::{format_display_path, get_config_path};
use notebridge::{
    load_user_config, read_config, write_config, FsNoteStore, GitHubProvider, ProviderConfig,
    ProviderRegistry, Report, SyncOrchestrator, Workspace, WorkspaceConfig,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

/// Notebridge - keep Markdown notes and remote issue trackers in sync
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Workspace directory (default: nearest parent holding `.notebridge/`)
    #[arg(long, global = true, env = "NOTEBRIDGE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable JSON log format (for log aggregation)
    #[arg(long, global = true, env = "NOTEBRIDGE_LOG_JSON", default_value = "false")]
    log_json: bool,

    /// Log rotation period: daily, hourly, or never
    #[arg(long, global = true, env = "NOTEBRIDGE_LOG_ROTATION", default_value = "daily")]
    log_rotation: String,

    /// Custom log directory (default: ~/.notebridge/logs)
    #[arg(long, global = true, env = "NOTEBRIDGE_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create `.notebridge/config.json` with a GitHub provider
    Init {
        /// Repository as owner/repo (default: inferred from the origin remote)
        #[arg(long)]
        repo: Option<String>,

        /// Local note type remote issues are stored as
        #[arg(long, default_value = "issue")]
        issues_type: String,

        /// Local note type pull requests are stored as (not synced if absent)
        #[arg(long)]
        prs_type: Option<String>,
    },
    /// Reconcile notes with the configured providers
    Sync {
        /// Only sync this provider
        #[arg(long)]
        provider: Option<String>,
    },
    /// Create a remote issue from an unlinked note and link it
    Publish {
        /// Path of the note
        path: PathBuf,

        /// Provider to publish to
        #[arg(long, default_value = GitHubProvider::NAME)]
        provider: String,
    },
    /// List configured providers and whether an adapter is available
    Providers,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Install color-eyre error hooks for colored error output
    color_eyre::install()?;

    let args = Args::parse();

    let defaults = LogConfig::default();
    let log_config = LogConfig {
        log_dir: args.log_dir.clone().unwrap_or(defaults.log_dir),
        json_format: args.log_json,
        rotation: parse_rotation(&args.log_rotation),
        log_level: defaults.log_level,
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Error: Failed to initialize logging: {e}");
        eprintln!("Logs: {}", log_config.log_file().display());
        return Err(e);
    }
    debug!("Logging to {}", get_log_file_path());

    match args.command {
        Command::Init {
            ref repo,
            ref issues_type,
            ref prs_type,
        } => {
            init_workspace(&args, repo.as_deref(), issues_type, prs_type.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Sync { ref provider } => sync(&args, provider.as_deref()).await,
        Command::Publish {
            ref path,
            ref provider,
        } => {
            publish(&args, path, provider).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Providers => {
            list_providers(&args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_workspace(args: &Args) -> Result<Workspace> {
    let start = match &args.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    Ok(Workspace::resolve(&start)?)
}

async fn init_workspace(
    args: &Args,
    repo: Option<&str>,
    issues_type: &str,
    prs_type: Option<&str>,
) -> Result<()> {
    let root = match &args.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    let config_path = get_config_path(&root);
    if config_path.exists() {
        return Err(eyre!(
            "Workspace already initialized: {}",
            format_display_path(&config_path.display().to_string())
        ));
    }

    let mut github =
        ProviderConfig::new(GitHubProvider::NAME).with_setting(ISSUES_TYPE_KEY, issues_type);
    if let Some(repo) = repo {
        github = github.with_setting(REPO_KEY, repo);
    }
    if let Some(prs_type) = prs_type {
        github = github.with_setting(PRS_TYPE_KEY, prs_type);
    }
    let config = WorkspaceConfig {
        providers: vec![github],
    };
    write_config(&root, &config).await?;
    info!("Initialized workspace at {}", root.display());
    println!(
        "Created {}",
        format_display_path(&config_path.display().to_string())
    );
    Ok(())
}

async fn sync(args: &Args, only: Option<&str>) -> Result<ExitCode> {
    let workspace = resolve_workspace(args)?;
    let config = read_config(workspace.root()).await?;
    let selected: Vec<ProviderConfig> = match only {
        Some(name) => vec![config
            .provider(name)
            .cloned()
            .ok_or_else(|| eyre!("Provider '{name}' is not configured"))?],
        None => config.providers.clone(),
    };
    if selected.is_empty() {
        info!("No providers configured in {}", workspace.config_path().display());
    }

    let user_config = load_user_config()?;
    let registry = ProviderRegistry::builtin();
    let store = FsNoteStore::new(workspace.root());
    let orchestrator = SyncOrchestrator::new(&registry, &store, &workspace, &user_config);

    let reports = orchestrator.sync_all(&selected).await;
    print_reports(&reports, args.json)?;

    Ok(if reports.iter().any(Report::has_failures) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_reports(reports: &[Report], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
    } else {
        for report in reports {
            println!("{report}");
        }
    }
    Ok(())
}

async fn publish(args: &Args, path: &Path, provider: &str) -> Result<()> {
    let workspace = resolve_workspace(args)?;
    let config = read_config(workspace.root()).await?;
    let provider_config = config
        .provider(provider)
        .ok_or_else(|| eyre!("Provider '{provider}' is not configured"))?;

    let user_config = load_user_config()?;
    let registry = ProviderRegistry::builtin();
    let store = FsNoteStore::new(workspace.root());
    let orchestrator = SyncOrchestrator::new(&registry, &store, &workspace, &user_config);

    let note = orchestrator
        .publish(provider_config, &path.canonicalize()?)
        .await?;
    let linkage = note
        .linkage
        .ok_or_else(|| eyre!("Published note has no linkage"))?;
    let display_path = format_display_path(&note.path.display().to_string());
    if args.json {
        let output = serde_json::json!({
            "path": display_path,
            "provider": linkage.provider,
            "id": linkage.id,
            "url": linkage.url,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Published {display_path} as {} #{} {}",
            linkage.provider, linkage.id, linkage.url
        );
    }
    Ok(())
}

async fn list_providers(args: &Args) -> Result<()> {
    let workspace = resolve_workspace(args)?;
    let config = read_config(workspace.root()).await?;
    let registry = ProviderRegistry::builtin();

    if args.json {
        let output: Vec<_> = config
            .providers
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "registered": registry.contains(&p.name),
                    "settings": p.settings,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for provider in &config.providers {
        let status = if registry.contains(&provider.name) {
            "registered"
        } else {
            "no adapter (skipped)"
        };
        println!("{}: {status}", provider.name);
        for kind in [ItemKind::Issue, ItemKind::PullRequest] {
            match provider.local_type_for(kind) {
                Some(note_type) => println!("  {kind} -> {note_type}"),
                None => println!("  {kind} -> not synced"),
            }
        }
    }
    let available: Vec<&str> = registry.names().collect();
    println!("Available adapters: {}", available.join(", "));
    Ok(())
}
