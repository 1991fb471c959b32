//! groupscope - directory group-membership reports
//!
//! Resolves nested group membership, compares principals, and looks up group
//! and user attributes against a directory snapshot. Reports go to stdout or
//! a CSV file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use groupscope_core::{DirectoryProvider, Principal, ResultSink};
use groupscope_membership::directory::{InMemoryDirectory, MemoizedDirectory, MeteredDirectory};
use groupscope_membership::input::read_principals_csv;
use groupscope_membership::{
    group_info_table, user_info_table, ClosureResolver, ConsoleSink, CsvSink, Depth,
    DifferenceEngine, InfoLookup, MembershipError, OverwritePolicy, Table, UnresolvedPolicy,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod config;

use config::GroupscopeConfig;

/// groupscope CLI
#[derive(Parser)]
#[command(name = "groupscope")]
#[command(about = "Directory group-membership reports")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "GROUPSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory snapshot (overrides config)
    #[arg(short, long, env = "GROUPSCOPE_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Write the report to this CSV file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replace the output file if it already exists
    #[arg(short, long)]
    force: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every group a principal belongs to, directly or through nesting
    Closure {
        /// Account or group name
        principal: String,
    },

    /// Show the groups that distinguish two or more principals
    Compare {
        /// Principals to compare
        principals: Vec<String>,

        /// CSV file with one principal per row (first column)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Follow nested membership instead of direct membership only
        #[arg(short, long)]
        transitive: bool,

        /// What to do with principals that cannot be resolved
        #[arg(long, value_name = "abort|empty")]
        on_unresolved: Option<UnresolvedPolicy>,
    },

    /// Look up group attributes
    GroupInfo {
        /// Group names
        groups: Vec<String>,

        /// CSV file with one group per row (first column)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Add a Member Count column
        #[arg(short, long)]
        member_count: bool,
    },

    /// Look up user attributes
    UserInfo {
        /// Account names
        users: Vec<String>,

        /// CSV file with one account per row (first column)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for reports
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .init();

    let mut config = GroupscopeConfig::load_or_default(cli.config.as_deref())?;
    if let Some(snapshot) = cli.directory.clone() {
        config.directory.snapshot = Some(snapshot);
    }
    if cli.force {
        config.output.overwrite = OverwritePolicy::Replace;
    }
    config.validate()?;

    let snapshot = config
        .directory
        .snapshot
        .clone()
        .context("No directory snapshot configured; pass --directory or set [directory].snapshot")?;
    let directory = InMemoryDirectory::from_snapshot_file(&snapshot).await?;

    // Metrics sit below the memo so they count real directory round-trips
    let metered = Arc::new(MeteredDirectory::new(directory));
    let memo = config
        .resolver
        .memoize
        .then(|| Arc::new(MemoizedDirectory::new(Arc::clone(&metered))));
    let provider: Arc<dyn DirectoryProvider> = match &memo {
        Some(memo) => Arc::clone(memo) as Arc<dyn DirectoryProvider>,
        None => Arc::clone(&metered) as Arc<dyn DirectoryProvider>,
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling outstanding lookups");
            interrupt.cancel();
        }
    });

    let table = run(cli.command, &config, provider, &cancel).await?;

    let mut sink: Box<dyn ResultSink> = match &cli.output {
        Some(path) => Box::new(CsvSink::new(path, config.output.overwrite)),
        None => Box::new(ConsoleSink::stdout()),
    };
    sink.write_table(&table).await.context("Failed to write report")?;

    let stats = metered.stats();
    let operations = [stats.parent_groups, stats.attributes, stats.member_counts];
    info!(
        directory_calls = stats.total_calls(),
        parent_group_calls = stats.parent_groups.calls,
        not_found = operations.iter().map(|op| op.not_found).sum::<u64>(),
        failures = operations.iter().map(|op| op.failures).sum::<u64>(),
        "Lookup statistics"
    );
    if let Some(memo) = memo {
        let memo_stats = memo.stats();
        info!(
            hits = memo_stats.hits,
            misses = memo_stats.misses,
            hit_rate = memo_stats.hit_rate(),
            "Lookup memo statistics"
        );
    }

    Ok(())
}

async fn run(
    command: Command,
    config: &GroupscopeConfig,
    provider: Arc<dyn DirectoryProvider>,
    cancel: &CancellationToken,
) -> Result<Table> {
    let has_headers = config.output.input_has_headers;

    match command {
        Command::Closure { principal } => {
            let resolver = ClosureResolver::with_config(provider, config.resolver_config());
            let result = resolver
                .closure_with_cancel(&Principal::new(principal), cancel)
                .await?;

            if result.start_in_cycle {
                info!(principal = %result.start, "Principal is reachable from its own groups");
            }
            for pruned in &result.pruned {
                warn!(
                    group = %pruned.principal,
                    reason = ?pruned.reason,
                    "Nested membership below this group is missing from the report"
                );
            }
            Ok(result.to_table())
        }

        Command::Compare {
            principals,
            input,
            transitive,
            on_unresolved,
        } => {
            let principals = collect_names(principals, input.as_deref(), has_headers).await?;
            let mut compare = config.compare_config();
            if transitive {
                compare.depth = Depth::Transitive;
            }
            if let Some(policy) = on_unresolved {
                compare.on_unresolved = policy;
            }

            let engine = DifferenceEngine::new(provider, compare);
            let diff = engine.compare_with_cancel(&principals, cancel).await?;
            for principal in &diff.unresolved {
                warn!(principal = %principal, "Compared as having no groups");
            }
            for principal in &diff.incomplete {
                warn!(principal = %principal, "Nested membership is partial for this principal");
            }
            Ok(diff.to_table())
        }

        Command::GroupInfo {
            groups,
            input,
            member_count,
        } => {
            let names = collect_names(groups, input.as_deref(), has_headers).await?;
            let lookup = InfoLookup::new(provider, config.resolver.max_concurrent_lookups);
            let rows = cancellable(cancel, lookup.groups(&names, member_count)).await?;
            Ok(group_info_table(&rows, member_count))
        }

        Command::UserInfo { users, input } => {
            let names = collect_names(users, input.as_deref(), has_headers).await?;
            let lookup = InfoLookup::new(provider, config.resolver.max_concurrent_lookups);
            let rows = cancellable(cancel, lookup.users(&names)).await?;
            Ok(user_info_table(&rows))
        }
    }
}

/// Positional names first, then the names listed in `input`
async fn collect_names(
    positional: Vec<String>,
    input: Option<&Path>,
    has_headers: bool,
) -> Result<Vec<Principal>> {
    let mut names: Vec<Principal> = positional.into_iter().map(Principal::from).collect();
    if let Some(path) = input {
        let listed = read_principals_csv(path, has_headers).await?;
        info!(path = %path.display(), count = listed.len(), "Read names from input file");
        names.extend(listed);
    }
    Ok(names)
}

async fn cancellable<T, F>(cancel: &CancellationToken, work: F) -> groupscope_membership::Result<T>
where
    F: Future<Output = groupscope_membership::Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(MembershipError::Cancelled),
        result = work => result,
    }
}
