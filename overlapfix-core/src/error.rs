use std::path::PathBuf;

use snafu::prelude::*;

use crate::analysis::category::ClassId;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OverlapError {
    #[snafu(display("Read annotation `{}` error: {}", path.display(), source))]
    ReadAnnotation {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Write annotation `{}` error: {}", path.display(), source))]
    WriteAnnotation {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Invalid discovery pattern `{}`: {}", pattern, source))]
    Discover {
        source: glob::PatternError,
        pattern: String,
    },
    #[snafu(display("Walk annotation tree error: {}", source))]
    WalkEntry { source: glob::GlobError },
    #[snafu(display("Read category table `{}` error: {}", path.display(), source))]
    ReadCategories {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Parse category table error: {}", source))]
    CategoryJson { source: serde_json::Error },
    #[snafu(display("Class ids {:?} are listed as both valve and actuator", ids))]
    OverlappingCategories { ids: Vec<ClassId> },
    #[snafu(display("Build worker pool with {} threads error: {}", jobs, source))]
    ThreadPool {
        source: rayon::ThreadPoolBuildError,
        jobs: usize,
    },
}
