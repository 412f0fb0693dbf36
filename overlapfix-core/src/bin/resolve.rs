use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use overlapfix_core::{
    CategoryTable, Corpus, CorpusReport, Resolver, ResolverConfigBuilder, Verifier,
};

#[derive(Parser)]
#[command(name = "resolve")]
#[command(about = "Clip actuator boxes so they no longer overlap valve boxes")]
struct Args {
    #[arg(required = true, help = "Annotation directories (searched recursively) or files")]
    inputs: Vec<PathBuf>,

    #[arg(long, help = "Report changes without rewriting any file")]
    dry_run: bool,

    #[arg(long, help = "Audit the corpus for residual overlap after resolving")]
    verify: bool,

    #[arg(long, help = "JSON file with `valves` and `actuators` class id lists")]
    categories: Option<PathBuf>,

    #[arg(short, long, help = "Worker threads (defaults to one per core)")]
    jobs: Option<usize>,

    #[arg(long, help = "Print the summary as JSON")]
    json: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let categories = match &args.categories {
        Some(path) => CategoryTable::from_json_file(path)?,
        None => CategoryTable::default(),
    };

    let mut corpus = Corpus::discover(&args.inputs)?;
    if let Some(jobs) = args.jobs {
        corpus = corpus.with_jobs(jobs)?;
    }
    if corpus.is_empty() {
        warn!("No annotation files found");
    }

    let config = ResolverConfigBuilder::default()
        .dry_run(args.dry_run)
        .categories(categories.clone())
        .build()?;
    let resolver = Resolver::new(config);

    info!("Updating annotations...");
    let mut report = corpus.resolve(&resolver);

    if args.verify {
        info!("Verifying annotations...");
        report.absorb_verify(corpus.verify(&Verifier::new(categories)));
    }

    print_report(&report, args.dry_run, args.verify, args.json)?;

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(
    report: &CorpusReport,
    dry_run: bool,
    verified: bool,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\n=== Resolve Summary ===");
    println!("Files scanned: {}", report.files_scanned);
    if dry_run {
        println!("Files that would change: {}", report.files_modified);
    } else {
        println!("Files modified: {}", report.files_modified);
    }
    println!("Actuators clipped: {}", report.actuators_clipped);
    println!("Actuators removed: {}", report.actuators_removed);

    if verified {
        for file in &report.overlaps {
            println!("Overlap found in {}: {}", file.path.display(), file.overlaps);
        }
        if report.total_overlaps == 0 {
            println!("Verification Successful: No overlaps found.");
        } else {
            println!(
                "Verification Failed: Found {} overlaps in {} files.",
                report.total_overlaps, report.files_with_overlap
            );
        }
    }

    if !report.failures.is_empty() {
        println!("\nFailed files:");
        for failure in &report.failures {
            println!("  - {}: {}", failure.path.display(), failure.message);
        }
    }

    Ok(())
}
