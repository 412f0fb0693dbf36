use std::path::Path;

use tracing::*;

use crate::{
    analysis::category::{Category, CategoryTable, ClassId},
    annotation::{file::AnnotationFile, record::Annotation},
    consts::OVERLAP_EPSILON,
    error::OverlapError,
};

/// Number of actuator/valve pairs that overlap by more than
/// [`OVERLAP_EPSILON`] on both axes.
///
/// Counts pairs, not boxes: an actuator crossing two valves contributes 2.
pub fn count_overlaps(annotations: &[Annotation], categories: &CategoryTable) -> usize {
    overlapping_pairs(annotations, categories, OVERLAP_EPSILON).len()
}

/// Indices into `annotations` of every overlapping `(actuator, valve)` pair,
/// actuator-major in input order.
pub fn overlapping_pairs(
    annotations: &[Annotation],
    categories: &CategoryTable,
    epsilon: f64,
) -> Vec<(usize, usize)> {
    let (mut valves, mut actuators) = (Vec::new(), Vec::new());
    for (idx, annotation) in annotations.iter().enumerate() {
        match categories.classify(annotation.class_id) {
            Category::Valve => valves.push((idx, annotation.corner())),
            Category::Actuator => actuators.push((idx, annotation.corner())),
            Category::Other => {}
        }
    }

    let mut pairs = Vec::new();
    for (actuator_idx, actuator) in &actuators {
        for (valve_idx, valve) in &valves {
            if actuator.overlaps(valve, epsilon) {
                pairs.push((*actuator_idx, *valve_idx));
            }
        }
    }
    pairs
}

/// Audits annotation files for residual actuator/valve overlap.
#[derive(Debug, Clone)]
pub struct Verifier {
    pub categories: CategoryTable,
    pub epsilon: f64,
}

impl Verifier {
    pub fn new(categories: CategoryTable) -> Self {
        Self {
            categories,
            epsilon: OVERLAP_EPSILON,
        }
    }

    pub fn count(&self, annotations: &[Annotation]) -> usize {
        overlapping_pairs(annotations, &self.categories, self.epsilon).len()
    }

    /// Residual overlap count of one file.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn verify_file(&self, path: &Path) -> Result<usize, OverlapError> {
        let file = AnnotationFile::load(path)?;
        let overlaps = self.count(&file.annotations);

        if overlaps > 0 {
            warn!("overlap found: {}", overlaps);
        }

        Ok(overlaps)
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(CategoryTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bbox::{Bbox, CenterBox};

    fn record(class_id: ClassId, bbox: Bbox) -> Annotation {
        Annotation::new(class_id, bbox.to_center())
    }

    #[test]
    fn test_counts_pairs_not_boxes() {
        let annotations = vec![
            record(29, Bbox::from_corners(0.0, 0.0, 1.0, 1.0)),
            record(0, Bbox::from_corners(0.0, 0.0, 0.25, 0.25)),
            record(1, Bbox::from_corners(0.75, 0.75, 1.0, 1.0)),
            // Other classes never count
            record(50, Bbox::from_corners(0.0, 0.0, 1.0, 1.0)),
        ];

        assert_eq!(count_overlaps(&annotations, CategoryTable::global()), 2);
        assert_eq!(
            overlapping_pairs(&annotations, CategoryTable::global(), OVERLAP_EPSILON),
            vec![(0, 1), (0, 2)]
        );
    }

    #[test]
    fn test_same_category_overlap_is_ignored() {
        let annotations = vec![
            record(29, Bbox::from_corners(0.0, 0.0, 0.5, 0.5)),
            record(30, Bbox::from_corners(0.25, 0.25, 0.75, 0.75)),
            record(0, Bbox::from_corners(0.5, 0.5, 1.0, 1.0)),
            record(1, Bbox::from_corners(0.5, 0.5, 1.0, 1.0)),
        ];

        // Only actuator 30 crosses the two stacked valves
        assert_eq!(count_overlaps(&annotations, CategoryTable::global()), 2);
    }

    #[test]
    fn test_touching_boxes_do_not_count() {
        let annotations = vec![
            record(29, Bbox::from_corners(0.0, 0.0, 0.5, 1.0)),
            record(0, Bbox::from_corners(0.5, 0.0, 1.0, 1.0)),
            // Crossing by 4e-7 is inside the tolerance
            Annotation::new(30, CenterBox::new(0.25, 0.5, 0.5000008, 0.5)),
        ];

        assert_eq!(count_overlaps(&annotations, CategoryTable::global()), 0);
    }

    #[test]
    fn test_verify_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.txt");
        std::fs::write(&path, "29 0.5 0.5 1.0 1.0\n0 0.5 0.5 0.2 0.2\nbroken line\n").unwrap();

        let verifier = Verifier::default();
        assert_eq!(verifier.verify_file(&path).unwrap(), 1);
        assert!(verifier.verify_file(&dir.path().join("missing.txt")).is_err());
    }
}
