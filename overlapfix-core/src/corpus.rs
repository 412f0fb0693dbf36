use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use snafu::ResultExt;
use tracing::*;

use crate::{
    consts::ANNOTATION_EXTENSION,
    error::{DiscoverSnafu, OverlapError, ThreadPoolSnafu, WalkEntrySnafu},
    resolve::Resolver,
    verify::Verifier,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOverlap {
    pub path: PathBuf,
    pub overlaps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of a resolve or verify pass over a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusReport {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub actuators_clipped: usize,
    pub actuators_removed: usize,
    pub files_with_overlap: usize,
    pub total_overlaps: usize,
    pub overlaps: Vec<FileOverlap>,
    pub failures: Vec<FileFailure>,
}

impl CorpusReport {
    /// No residual overlap and no failed file.
    pub fn is_clean(&self) -> bool {
        self.total_overlaps == 0 && self.failures.is_empty()
    }

    fn record_failure(&mut self, path: &Path, err: OverlapError) {
        error!("{}", err);
        self.failures.push(FileFailure {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }

    /// Folds a verify pass into this report, keeping resolve counters.
    pub fn absorb_verify(&mut self, verify: CorpusReport) {
        self.files_with_overlap = verify.files_with_overlap;
        self.total_overlaps = verify.total_overlaps;
        self.overlaps = verify.overlaps;
        self.failures.extend(verify.failures);
    }
}

/// A sorted, de-duplicated set of annotation files processed file-at-a-time
/// on a worker pool.
pub struct Corpus {
    paths: Vec<PathBuf>,
    pool: Option<rayon::ThreadPool>,
}

impl Corpus {
    pub fn new(mut paths: Vec<PathBuf>) -> Self {
        paths.sort();
        paths.dedup();
        Self { paths, pool: None }
    }

    /// Collects annotation files from directories (searched recursively) and
    /// explicit file paths.
    pub fn discover<P: AsRef<Path>>(inputs: &[P]) -> Result<Self, OverlapError> {
        let mut paths = Vec::new();

        for input in inputs {
            let input = input.as_ref();
            if !input.is_dir() {
                paths.push(input.to_path_buf());
                continue;
            }

            let root = glob::Pattern::escape(&input.to_string_lossy());
            let pattern = format!("{}/**/*.{}", root, ANNOTATION_EXTENSION);
            for entry in glob::glob(&pattern).context(DiscoverSnafu { pattern: &pattern })? {
                let path = entry.context(WalkEntrySnafu)?;
                if path.is_file() {
                    paths.push(path);
                }
            }
        }

        let corpus = Self::new(paths);
        info!("Found {} annotation files", corpus.len());
        Ok(corpus)
    }

    /// Runs on a dedicated pool of `jobs` threads instead of the global one.
    pub fn with_jobs(mut self, jobs: usize) -> Result<Self, OverlapError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context(ThreadPoolSnafu { jobs })?;
        self.pool = Some(pool);
        Ok(self)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    // Results come back in path order regardless of scheduling.
    fn map<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Path) -> T + Sync + Send,
    {
        let run = || {
            self.paths
                .par_iter()
                .map(|path| f(path.as_path()))
                .collect::<Vec<T>>()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Resolves every file, rewriting those that change.
    ///
    /// A file that fails to load or save is recorded and the run continues.
    #[tracing::instrument(skip_all, fields(files = self.len()))]
    pub fn resolve(&self, resolver: &Resolver) -> CorpusReport {
        let results = self.map(|path| resolver.resolve_file(path));

        let mut report = CorpusReport {
            files_scanned: self.len(),
            ..Default::default()
        };
        for (path, result) in self.paths.iter().zip(results) {
            match result {
                Ok(resolution) => {
                    if resolution.modified {
                        report.files_modified += 1;
                    }
                    report.actuators_clipped += resolution.clipped();
                    report.actuators_removed += resolution.removed();
                }
                Err(err) => report.record_failure(path, err),
            }
        }

        info!(
            "Modified {} of {} files ({} clipped, {} removed)",
            report.files_modified,
            report.files_scanned,
            report.actuators_clipped,
            report.actuators_removed
        );
        report
    }

    /// Counts residual overlap in every file.
    #[tracing::instrument(skip_all, fields(files = self.len()))]
    pub fn verify(&self, verifier: &Verifier) -> CorpusReport {
        let results = self.map(|path| verifier.verify_file(path));

        let mut report = CorpusReport {
            files_scanned: self.len(),
            ..Default::default()
        };
        for (path, result) in self.paths.iter().zip(results) {
            match result {
                Ok(0) => {}
                Ok(overlaps) => {
                    report.files_with_overlap += 1;
                    report.total_overlaps += overlaps;
                    report.overlaps.push(FileOverlap {
                        path: path.clone(),
                        overlaps,
                    });
                }
                Err(err) => report.record_failure(path, err),
            }
        }

        if report.total_overlaps == 0 {
            info!("Verification successful: no overlaps found");
        } else {
            warn!(
                "Verification failed: found {} overlaps in {} files",
                report.total_overlaps, report.files_with_overlap
            );
        }
        report
    }
}
