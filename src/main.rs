use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use ytetl::{
    init_tracing_once, CheckpointPolicy, CleanReport, CommentOrder, Domain, FetchOptions, FetchReport,
    PublishWindow, QualityConfig, SearchOrder, YouTubeClient, YouTubeETL,
};

#[derive(Parser)]
#[command(name = "ytetl")]
#[command(about = "Fetch YouTube comments per domain and filter them into a clean corpus")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover videos for a domain and fetch their top-level comments
    Fetch(FetchArgs),
    /// Deduplicate, normalize and quality-filter raw comments
    Clean(CleanArgs),
}

#[derive(Args)]
struct FetchArgs {
    #[arg(long, value_enum)]
    domain: Domain,

    /// Stop after this many comments
    #[arg(long, default_value_t = 20_000)]
    target: usize,

    /// Search result pages per query
    #[arg(long, default_value_t = 10)]
    pages: usize,

    #[arg(long, default_value_t = 500)]
    per_video_limit: usize,

    #[arg(long, value_enum, default_value = "relevance")]
    order_comments_by: CommentOrder,

    /// Ordering of video search results
    #[arg(long, value_enum, default_value = "view-count")]
    search_order: SearchOrder,

    /// Seconds to wait between videos
    #[arg(long, default_value_t = 0.2)]
    sleep: f64,

    /// Publish year to search (default: current UTC year)
    #[arg(long)]
    year: Option<PublishWindow>,

    #[arg(long, default_value = "./data", env = "YTETL_DATA_DIR")]
    data_dir: PathBuf,

    /// Fetch the most viewed candidates first
    #[arg(long)]
    rank_by_views: bool,

    /// Checkpoint after this many new rows (0 disables)
    #[arg(long, default_value_t = 5_000)]
    checkpoint_every: usize,

    /// Also checkpoint when this many seconds passed since the last one
    #[arg(long)]
    checkpoint_secs: Option<u64>,

    #[arg(long)]
    region_code: Option<String>,

    #[arg(long)]
    relevance_language: Option<String>,

    #[arg(long)]
    no_progress: bool,
}

#[derive(Args)]
struct CleanArgs {
    #[arg(long, value_enum, required_unless_present = "all", conflicts_with = "all")]
    domain: Option<Domain>,

    /// Clean every domain with a raw file
    #[arg(long)]
    all: bool,

    #[arg(long, default_value = "./data", env = "YTETL_DATA_DIR")]
    data_dir: PathBuf,

    #[arg(long, default_value_t = 3)]
    min_chars: usize,

    #[arg(long, default_value_t = 2000)]
    max_chars: usize,

    #[arg(long, default_value_t = 2)]
    min_words: usize,

    /// Keep only comments detected as this language (e.g. en, zh)
    #[arg(long)]
    lang: Option<String>,

    /// Require a domain keyword in every kept comment
    #[arg(long)]
    domain_filter: bool,

    #[arg(long)]
    no_progress: bool,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing_once();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Fetch(args) => cmd_fetch(args),
        Commands::Clean(args) => cmd_clean(args),
    }
}

fn cmd_fetch(args: FetchArgs) -> Result<()> {
    if !args.sleep.is_finite() || args.sleep < 0.0 {
        bail!("--sleep must be a non-negative number of seconds");
    }
    // before any work: a missing key is fatal
    let client = YouTubeClient::from_env()?;

    let mut checkpoint = if args.checkpoint_every == 0 {
        CheckpointPolicy::never()
    } else {
        CheckpointPolicy::every_rows(args.checkpoint_every)
    };
    if let Some(secs) = args.checkpoint_secs {
        checkpoint = checkpoint.or_every(Duration::from_secs(secs));
    }

    let mut fetch = FetchOptions::default()
        .with_target_total(args.target)
        .with_search_pages(args.pages)
        .with_per_video_limit(args.per_video_limit)
        .with_comment_order(args.order_comments_by)
        .with_search_order(args.search_order)
        .with_sleep(Duration::from_secs_f64(args.sleep))
        .with_rank_by_views(args.rank_by_views)
        .with_checkpoint(checkpoint);
    if let Some(window) = args.year {
        fetch = fetch.with_window(window);
    }
    if let Some(code) = args.region_code {
        fetch = fetch.with_region_code(code);
    }
    if let Some(lang) = args.relevance_language {
        fetch = fetch.with_relevance_language(lang);
    }

    let etl = YouTubeETL::new()
        .data_dir(&args.data_dir)
        .progress(!args.no_progress)
        .fetch_options(fetch);
    let report = etl.fetch(args.domain, &client)?;
    print_fetch_summary(&report, &etl.paths().raw_csv(args.domain));
    Ok(())
}

fn cmd_clean(args: CleanArgs) -> Result<()> {
    let mut quality = QualityConfig::default()
        .with_char_bounds(args.min_chars, args.max_chars)
        .with_min_words(args.min_words)
        .with_domain_filter(args.domain_filter);
    if let Some(lang) = &args.lang {
        quality = quality.with_target_language(lang);
    }

    let etl = YouTubeETL::new()
        .data_dir(&args.data_dir)
        .progress(!args.no_progress)
        .quality(quality);

    let reports = match args.domain {
        Some(domain) if !args.all => vec![etl.clean(domain)?],
        _ => etl.clean_all()?,
    };
    if reports.is_empty() {
        println!("No raw comment files under {}", etl.paths().raw_dir.display());
    }
    for r in &reports {
        print_clean_summary(r);
    }
    Ok(())
}

fn print_fetch_summary(report: &FetchReport, out: &std::path::Path) {
    println!(
        "Fetched {} comments from {} of {} candidate videos ({}); {} checkpoint(s)",
        report.rows_written, report.videos_fetched, report.candidate_videos, report.stop, report.checkpoints
    );
    println!("  wrote {}", out.display());
    for q in &report.failed_queries {
        println!("  search failed for {:?}: {}", q.query, q.error);
    }
    if !report.skipped.is_empty() {
        println!("  skipped {} video(s):", report.skipped.len());
        for s in &report.skipped {
            println!("    {} ({} rows kept): {}", s.video_id, s.rows_kept, s.error);
        }
    }
}

fn print_clean_summary(r: &CleanReport) {
    println!(
        "{}: {} rows in, {} exact + {} near + {} same-id duplicates removed, {} kept, {} dropped",
        r.domain, r.input_rows, r.dedupe.exact, r.dedupe.near, r.dedupe.identity, r.kept, r.dropped
    );
    for (reason, n) in &r.reasons {
        println!("    {:<16} {n}", reason.as_str());
    }
    println!("  wrote {}", r.clean_path.display());
    println!("  wrote {}", r.dropped_path.display());
}
