//! seedscan - correlate qBittorrent, Radarr, and Sonarr with the filesystem.
//!
//! Usage:
//!   seedscan scan         Full scan: relationships, hardlinks, orphans, cross-seeds
//!   seedscan orphans      Orphaned files only
//!   seedscan hardlinks    Hardlink groups only
//!   seedscan info         Show the effective configuration
//!   seedscan --help       Show help

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use seedscan_clients::{QbittorrentClient, RadarrClient, SonarrClient};
use seedscan_core::{AppConfig, CrossSeedGroup, HardlinkGroup, OrphanedFile, ScanReport};
use seedscan_correlate::ScanCoordinator;

#[derive(Parser)]
#[command(
    name = "seedscan",
    version,
    about = "Media file relationship and orphan detection tool",
    long_about = "seedscan correlates your qBittorrent, Radarr, and Sonarr setup with the\n\
                  filesystem to show which files are hardlinked together, which are\n\
                  tracked by which service, and which are orphaned."
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Perform a complete scan of all services and filesystems
    Scan {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Find and display orphaned files
    Orphans {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Analyze hardlinks between torrent and library directories
    Hardlinks {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Display configuration information
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Scan { format } => {
            let report = run_scan(&config).await?;
            match format {
                OutputFormat::Text => print_report(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Command::Orphans { format } => {
            let report = run_scan(&config).await?;
            match format {
                OutputFormat::Text => print_orphans(&report.orphans),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report.orphans)?)
                }
            }
        }
        Command::Hardlinks { format } => {
            let report = run_scan(&config).await?;
            match format {
                OutputFormat::Text => print_hardlinks(&report.hardlink_groups),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report.hardlink_groups)?)
                }
            }
        }
        Command::Info => print_info(&config),
    }

    Ok(())
}

/// Wire up the clients and run the full pipeline, cancellable with Ctrl-C.
async fn run_scan(config: &AppConfig) -> Result<ScanReport> {
    let remapper = config.paths.remapper();
    let qbit = Arc::new(QbittorrentClient::new(&config.qbittorrent, remapper.clone())?);
    let radarr = Arc::new(RadarrClient::new(&config.radarr, remapper.clone())?);
    let sonarr = Arc::new(SonarrClient::new(&config.sonarr, remapper)?);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling scan...");
            signal_cancel.cancel();
        }
    });

    let coordinator =
        ScanCoordinator::new(qbit, radarr, sonarr, config.paths.clone()).with_cancellation(cancel);

    eprintln!("Scanning...");
    coordinator.run_full_scan().await.context("Scan failed")
}

fn print_report(report: &ScanReport) {
    let stats = &report.statistics;

    println!();
    println!("{}", "─".repeat(70));
    println!(" Scan Report - {}", report.scanned_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("{}", "─".repeat(70));
    println!(
        " {} files ({}) - {} in torrent roots, {} in library roots",
        stats.total_files,
        format_size(stats.total_size),
        stats.torrent_files,
        stats.library_files
    );
    println!(
        " {} torrents, {} Radarr items, {} Sonarr items",
        stats.torrents_count, stats.radarr_items, stats.sonarr_items
    );
    println!(
        " {} hardlink groups, {} cross-seed groups",
        stats.hardlink_groups, stats.cross_seed_groups
    );
    println!(
        " {} orphaned files ({})",
        stats.orphaned_files,
        format_size(stats.orphaned_size)
    );
    println!(" Scanned in {:.2}s", stats.scan_duration.as_secs_f64());
    println!("{}", "─".repeat(70));

    if !report.cross_seed_groups.is_empty() {
        println!();
        print_cross_seeds(&report.cross_seed_groups);
    }

    if !report.orphans.is_empty() {
        println!();
        print_orphans(&report.orphans);
    }

    if report.has_warnings() {
        println!();
        println!(" {} warning(s) during scan, see logs", report.warnings.len());
    }
}

fn print_orphans(orphans: &[OrphanedFile]) {
    println!("{}", "─".repeat(70));
    println!(" Orphaned Files");
    println!("{}", "─".repeat(70));

    if orphans.is_empty() {
        println!(" No orphaned files found.");
        return;
    }

    let total: u64 = orphans.iter().map(|o| o.size).sum();
    println!(" {} orphaned files, {}", orphans.len(), format_size(total));
    println!();

    for orphan in orphans {
        println!(
            " {:>10}  {}  ({})",
            format_size(orphan.size),
            orphan.path.display(),
            orphan.reason
        );
    }
}

fn print_hardlinks(groups: &[HardlinkGroup]) {
    println!("{}", "─".repeat(70));
    println!(" Hardlink Groups");
    println!("{}", "─".repeat(70));

    if groups.is_empty() {
        println!(" No hardlink groups found.");
        return;
    }

    let saved: u64 = groups
        .iter()
        .map(|g| g.apparent_size() - g.file_size)
        .sum();
    println!(
        " {} groups, {} saved by hardlinking",
        groups.len(),
        format_size(saved)
    );
    println!();

    for (i, group) in groups.iter().enumerate() {
        println!(
            " Group {} ({} links, {} each)",
            i + 1,
            group.link_count,
            format_size(group.file_size)
        );
        for path in &group.files {
            println!("   {}", path.display());
        }
        println!();
    }
}

fn print_cross_seeds(groups: &[CrossSeedGroup]) {
    println!("{}", "─".repeat(70));
    println!(" Cross-Seed Groups");
    println!("{}", "─".repeat(70));

    for (i, group) in groups.iter().enumerate() {
        println!(
            " Group {} ({} torrents, {} files, {})",
            i + 1,
            group.torrent_count(),
            group.files.len(),
            format_size(group.total_size)
        );
        for torrent in &group.torrents {
            let tracker = torrent.primary_tracker.as_deref().unwrap_or("no tracker");
            println!("   {}  [{}]", torrent.name, tracker);
        }
        println!();
    }
}

fn print_info(config: &AppConfig) {
    println!("{}", "─".repeat(70));
    println!(" Configuration");
    println!("{}", "─".repeat(70));
    println!(" qBittorrent  {}  (user: {})", config.qbittorrent.url(), config.qbittorrent.username);
    println!(
        " Radarr       {}  (api key {})",
        config.radarr.url(),
        if config.radarr.api_key.is_empty() { "not set" } else { "set" }
    );
    println!(
        " Sonarr       {}  (api key {})",
        config.sonarr.url(),
        if config.sonarr.api_key.is_empty() { "not set" } else { "set" }
    );
    println!(" Remap        {} -> {}",
        config.paths.remote_path_base.display(),
        config.paths.local_path_base.display()
    );
    for root in &config.paths.torrent_roots {
        println!(" Torrent root {}", root.display());
    }
    for root in &config.paths.library_roots {
        println!(" Library root {}", root.display());
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
