use std::path::{Path, PathBuf};

use snafu::ResultExt;
use tracing::*;

use crate::{
    annotation::record::Annotation,
    error::{OverlapError, ReadAnnotationSnafu, WriteAnnotationSnafu},
};

/// The boxes of one image, as read from its annotation file.
#[derive(Debug, Clone)]
pub struct AnnotationFile {
    pub path: PathBuf,
    pub annotations: Vec<Annotation>,
    /// Non-blank lines that did not parse as a record.
    pub skipped: usize,
}

impl AnnotationFile {
    /// Parses annotation text. Malformed lines are skipped, never an error.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Self {
        let path = path.into();
        let mut annotations = Vec::new();
        let mut skipped = 0;

        for line in text.split_inclusive('\n') {
            match Annotation::parse(line) {
                Some(annotation) => annotations.push(annotation),
                None if line.trim().is_empty() => {}
                None => {
                    skipped += 1;
                    debug!("skip malformed line in {}: `{}`", path.display(), line.trim_end());
                }
            }
        }

        Self {
            path,
            annotations,
            skipped,
        }
    }

    pub fn load(path: &Path) -> Result<Self, OverlapError> {
        let text = std::fs::read_to_string(path).context(ReadAnnotationSnafu { path })?;
        Ok(Self::parse(path, &text))
    }

    /// Image basename this file annotates (`img_001.txt` -> `img_001`).
    pub fn image_stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }

    /// Renders records one per line in the given order.
    pub fn render(annotations: &[Annotation]) -> String {
        let mut out = String::new();
        for annotation in annotations {
            annotation.write_line(&mut out);
        }
        out
    }

    /// Replaces the file content with the given records.
    pub fn save(path: &Path, annotations: &[Annotation]) -> Result<(), OverlapError> {
        std::fs::write(path, Self::render(annotations)).context(WriteAnnotationSnafu { path })
    }
}
