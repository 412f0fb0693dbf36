use std::path::Path;

use derive_builder::Builder;
use serde::Serialize;
use tracing::*;

use crate::{
    analysis::{
        bbox::Bbox,
        category::{CategoryTable, ClassId},
    },
    annotation::{file::AnnotationFile, record::Annotation},
    consts::{EXCESSIVE_REDUCTION_RATIO, OVERLAP_EPSILON},
    error::OverlapError,
};

pub mod clip;

pub use clip::{ClipCandidate, ClipSide, resolve_actuator_against_valve};

#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct ResolverConfig {
    /// Overlap tolerance for the clip gate.
    pub epsilon: f64,
    /// Remaining-area fraction below which a clip is reported as excessive.
    pub reduction_warn_ratio: f64,
    /// Compute outcomes without rewriting files.
    pub dry_run: bool,
    pub categories: CategoryTable,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            epsilon: OVERLAP_EPSILON,
            reduction_warn_ratio: EXCESSIVE_REDUCTION_RATIO,
            dry_run: false,
            categories: CategoryTable::default(),
        }
    }
}

/// What happened to one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Outcome {
    Unchanged,
    Clipped(Bbox),
    /// Fully consumed by valves, or clipped down to nothing after clamping.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActuatorOutcome {
    pub class_id: ClassId,
    pub original: Bbox,
    pub outcome: Outcome,
}

/// Result of resolving one file's boxes.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Output records: valves, then others, then surviving actuators.
    pub annotations: Vec<Annotation>,
    /// One entry per input actuator, in input order.
    pub outcomes: Vec<ActuatorOutcome>,
    pub modified: bool,
}

impl Resolution {
    pub fn clipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Clipped(_)))
            .count()
    }

    pub fn removed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::Removed)
            .count()
    }

    pub fn render(&self) -> String {
        AnnotationFile::render(&self.annotations)
    }
}

pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Clips one actuator against every valve in turn.
    ///
    /// Returns `None` as soon as a valve consumes the actuator; later valves
    /// are not consulted.
    pub fn resolve_actuator<'a>(
        &self,
        actuator: Bbox,
        valves: impl IntoIterator<Item = &'a Bbox>,
    ) -> Option<Bbox> {
        let mut current = actuator;
        for valve in valves {
            current = resolve_actuator_against_valve(&current, valve, self.config.epsilon)?;
        }
        Some(current)
    }

    /// Removes actuator/valve overlap from one image's boxes.
    ///
    /// Valve and other records are passed through verbatim. Unchanged
    /// actuators keep their original line; clipped actuators are rewritten in
    /// clamped, fixed-point center form.
    pub fn resolve_annotations(&self, annotations: &[Annotation]) -> Resolution {
        let partition = self.config.categories.partition(annotations);
        let valve_boxes: Vec<Bbox> = partition.valves.iter().map(|v| v.corner()).collect();

        let mut modified = false;
        let mut outcomes = Vec::with_capacity(partition.actuators.len());
        let mut kept_actuators = Vec::with_capacity(partition.actuators.len());

        for actuator in &partition.actuators {
            let original = actuator.corner();
            let original_area = original.area();

            let outcome = match self.resolve_actuator(original, &valve_boxes) {
                None => {
                    modified = true;
                    info!(class_id = actuator.class_id, "removed actuator fully inside a valve");
                    Outcome::Removed
                }
                Some(current) => {
                    let area = current.area();
                    if area < self.config.reduction_warn_ratio * original_area {
                        warn!(
                            class_id = actuator.class_id,
                            "excessive reduction, area reduced to {:.2}%",
                            area / original_area * 100.0
                        );
                    }

                    if current == original {
                        kept_actuators.push((*actuator).clone());
                        Outcome::Unchanged
                    } else {
                        modified = true;
                        let bbox = current.to_center().clamp_unit();
                        if bbox.is_degenerate() {
                            debug!(
                                class_id = actuator.class_id,
                                "clipped actuator vanished after clamping"
                            );
                            Outcome::Removed
                        } else {
                            kept_actuators.push(Annotation::new(actuator.class_id, bbox));
                            Outcome::Clipped(current)
                        }
                    }
                }
            };

            outcomes.push(ActuatorOutcome {
                class_id: actuator.class_id,
                original,
                outcome,
            });
        }

        let annotations = partition
            .valves
            .into_iter()
            .chain(partition.others)
            .cloned()
            .chain(kept_actuators)
            .collect();

        Resolution {
            annotations,
            outcomes,
            modified,
        }
    }

    /// Loads, resolves and, when modified, rewrites one annotation file.
    ///
    /// Unmodified files are never written.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn resolve_file(&self, path: &Path) -> Result<Resolution, OverlapError> {
        let file = AnnotationFile::load(path)?;
        let resolution = self.resolve_annotations(&file.annotations);

        if resolution.modified {
            if self.config.dry_run {
                debug!("dry run, leaving modified file untouched");
            } else {
                AnnotationFile::save(path, &resolution.annotations)?;
                debug!("rewrote {} records", resolution.annotations.len());
            }
        }

        Ok(resolution)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
