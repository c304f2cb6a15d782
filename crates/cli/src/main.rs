// ABOUTME: CLI for downloading recent podcast episodes from an RSS/Atom feed.
// ABOUTME: Resolves the feed into download plans and streams each missing episode to disk.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use castpull_downloader::{
    ClientOptions, DownloadRunner, HttpClient, ItemStatus, NoopProgress, ProgressReporter,
    ReqwestClient,
};
use castpull_feed::resolve_plans;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Download the most recent episodes of a podcast feed, skipping files the
/// output directory already has.
#[derive(Parser, Debug)]
#[command(name = "castpull")]
#[command(about = "Download the most recent episodes from an RSS/Atom feed", long_about = None)]
struct Args {
    /// URL of the RSS/Atom feed (http or https).
    feed_url: String,

    /// Output directory for downloaded files; created if absent.
    #[arg(short, long, default_value = "downloads")]
    output: PathBuf,

    /// Number of most recent episodes to download.
    #[arg(short, long, default_value_t = 10)]
    episodes: usize,

    /// Request timeout in seconds for the feed and each episode.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Resolve the feed and print the planned downloads as JSON, then exit.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Suppress per-episode progress bars.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let feed_url = Url::parse(&args.feed_url).context("feed URL is not a valid URL")?;
    if !matches!(feed_url.scheme(), "http" | "https") {
        bail!("feed URL must use http or https, got {}", feed_url.scheme());
    }
    if args.episodes == 0 {
        bail!("--episodes must be at least 1");
    }

    let options = ClientOptions {
        timeout: Duration::from_secs(args.timeout),
        ..ClientOptions::default()
    };
    let client = ReqwestClient::new(&options)?;

    println!("Fetching feed: {feed_url}");
    let document = client
        .fetch_feed(feed_url.as_str())
        .context("failed to fetch feed")?;

    let resolution = resolve_plans(&document, feed_url.as_str(), &args.output, args.episodes)?;
    println!(
        "Planned {} episode(s) ({} entries examined, {} without audio)",
        resolution.plans.len(),
        resolution.entries_examined,
        resolution.entries_skipped
    );

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&resolution.plans)?);
        return Ok(ExitCode::SUCCESS);
    }
    if resolution.plans.is_empty() {
        println!("Nothing to download.");
        return Ok(ExitCode::SUCCESS);
    }

    fs::create_dir_all(&args.output).with_context(|| {
        format!(
            "failed to create output directory {}",
            args.output.display()
        )
    })?;

    let runner = DownloadRunner::new(&client);
    let summary = if args.quiet {
        runner.run(&resolution.plans, &NoopProgress)
    } else {
        let progress = ConsoleProgress::default();
        runner.run(&resolution.plans, &progress)
    };

    for report in &summary.reports {
        match &report.status {
            ItemStatus::Downloaded { bytes } => {
                println!("downloaded {} ({bytes} bytes)", report.target_filename)
            }
            ItemStatus::Skipped => {
                println!("skipped {} (already exists)", report.target_filename)
            }
            ItemStatus::Failed { reason } => {
                eprintln!("failed {}: {reason}", report.target_filename)
            }
        }
    }
    println!(
        "Done: {} downloaded, {} skipped, {} failed. Files in {}",
        summary.downloaded(),
        summary.skipped(),
        summary.failed(),
        args.output.display()
    );

    if summary.failed() > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders one indicatif bar per transfer: a byte bar when the server
/// declared a length, a spinner otherwise.
#[derive(Default)]
struct ConsoleProgress {
    bar: RefCell<Option<ProgressBar>>,
}

impl ProgressReporter for ConsoleProgress {
    fn item_started(&self, filename: &str, total_bytes: Option<u64>) {
        let bar = match total_bytes {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template("{msg} [{bar:30}] {bytes}/{total_bytes}")
                        .expect("static progress template"),
                );
                bar
            }
            None => ProgressBar::new_spinner(),
        };
        bar.set_message(filename.to_string());
        *self.bar.borrow_mut() = Some(bar);
    }

    fn chunk_transferred(&self, _filename: &str, bytes_so_far: u64, _total_bytes: Option<u64>) {
        if let Some(bar) = self.bar.borrow().as_ref() {
            bar.set_position(bytes_so_far);
        }
    }

    fn item_finished(&self, _filename: &str, _status: &ItemStatus) {
        if let Some(bar) = self.bar.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }
}
