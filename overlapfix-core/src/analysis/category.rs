use std::{collections::BTreeSet, path::Path, sync::LazyLock};

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    annotation::record::Annotation,
    consts::{DEFAULT_ACTUATOR_IDS, DEFAULT_VALVE_IDS},
    error::{CategoryJsonSnafu, OverlapError, ReadCategoriesSnafu},
};

/// Integer class identifier of an annotation record.
pub type ClassId = i64;

static DEFAULT_TABLE: LazyLock<CategoryTable> = LazyLock::new(|| CategoryTable {
    valves: DEFAULT_VALVE_IDS.iter().copied().collect(),
    actuators: DEFAULT_ACTUATOR_IDS.iter().copied().collect(),
});

/// Overlap policy category of a class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Valve,
    Actuator,
    Other,
}

/// Immutable membership tables for the valve and actuator categories.
///
/// The two sets are disjoint, so every class id maps to exactly one
/// [`Category`]; ids in neither set are [`Category::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCategoryTable")]
pub struct CategoryTable {
    valves: BTreeSet<ClassId>,
    actuators: BTreeSet<ClassId>,
}

#[derive(Deserialize)]
struct RawCategoryTable {
    valves: Vec<ClassId>,
    actuators: Vec<ClassId>,
}

impl TryFrom<RawCategoryTable> for CategoryTable {
    type Error = OverlapError;

    fn try_from(raw: RawCategoryTable) -> Result<Self, Self::Error> {
        Self::new(raw.valves, raw.actuators)
    }
}

impl CategoryTable {
    pub fn new(
        valves: impl IntoIterator<Item = ClassId>,
        actuators: impl IntoIterator<Item = ClassId>,
    ) -> Result<Self, OverlapError> {
        let valves: BTreeSet<ClassId> = valves.into_iter().collect();
        let actuators: BTreeSet<ClassId> = actuators.into_iter().collect();

        let shared: Vec<ClassId> = valves.intersection(&actuators).copied().collect();
        if !shared.is_empty() {
            return Err(OverlapError::OverlappingCategories { ids: shared });
        }

        Ok(Self { valves, actuators })
    }

    /// The process-wide default table, built once on first use.
    pub fn global() -> &'static CategoryTable {
        &DEFAULT_TABLE
    }

    /// Parses a table from JSON of the form `{"valves": [..], "actuators": [..]}`.
    pub fn from_json_str(text: &str) -> Result<Self, OverlapError> {
        serde_json::from_str(text).context(CategoryJsonSnafu)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, OverlapError> {
        let text = std::fs::read_to_string(path).context(ReadCategoriesSnafu { path })?;
        Self::from_json_str(&text)
    }

    pub fn classify(&self, class_id: ClassId) -> Category {
        if self.valves.contains(&class_id) {
            Category::Valve
        } else if self.actuators.contains(&class_id) {
            Category::Actuator
        } else {
            Category::Other
        }
    }

    /// Splits annotations into valves, actuators and others, each in input
    /// order.
    pub fn partition<'a>(&self, annotations: &'a [Annotation]) -> Partition<'a> {
        let mut partition = Partition::default();

        for annotation in annotations {
            match self.classify(annotation.class_id) {
                Category::Valve => partition.valves.push(annotation),
                Category::Actuator => partition.actuators.push(annotation),
                Category::Other => partition.others.push(annotation),
            }
        }

        partition
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::global().clone()
    }
}

#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub valves: Vec<&'a Annotation>,
    pub actuators: Vec<&'a Annotation>,
    pub others: Vec<&'a Annotation>,
}
