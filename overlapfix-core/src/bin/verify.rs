use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use overlapfix_core::{CategoryTable, Corpus, Verifier};

#[derive(Parser)]
#[command(name = "verify")]
#[command(about = "Audit annotations for actuator/valve overlap")]
struct Args {
    #[arg(required = true, help = "Annotation directories (searched recursively) or files")]
    inputs: Vec<PathBuf>,

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

    let report = corpus.verify(&Verifier::new(categories));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for file in &report.overlaps {
            println!("Overlap found in {}: {}", file.path.display(), file.overlaps);
        }
        for failure in &report.failures {
            println!("Failed to read {}: {}", failure.path.display(), failure.message);
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

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
