use crate::analysis::category::ClassId;

/// Minimum intersection extent, on both axes, for two boxes to count as
/// overlapping.
///
/// Boxes whose shared edge is within this distance are treated as touching.
/// The value absorbs the rounding introduced by six-decimal persistence, so a
/// box clipped against a valve edge does not read back as crossing it.
pub const OVERLAP_EPSILON: f64 = 1e-6;

/// Fraction of the original actuator area below which a clipped actuator is
/// reported as excessively reduced.
///
/// The report is diagnostic only; the clipped box is still written.
pub const EXCESSIVE_REDUCTION_RATIO: f64 = 0.2;

/// Class ids annotated as actuators.
pub const DEFAULT_ACTUATOR_IDS: &[ClassId] = &[29, 30, 31, 32, 33, 34, 35, 74];

/// Class ids annotated as valves.
pub const DEFAULT_VALVE_IDS: &[ClassId] = &[
    0, 1, 2, 3, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27, 28, 41, 42, 43, 44, 67, 68, 70, 71, 198, 199, 200,
];

/// File extension of annotation files.
pub const ANNOTATION_EXTENSION: &str = "txt";

/// Number of whitespace separated tokens in one annotation record:
/// `class_id x_center y_center width height`.
pub const RECORD_FIELDS: usize = 5;

/// Decimal places written for each geometric field.
pub const COORD_PRECISION: usize = 6;
