pub mod analysis;
pub mod annotation;
pub mod consts;
pub mod corpus;
pub mod error;
pub mod resolve;
pub mod verify;

// Re-export commonly used types
pub use analysis::{
    bbox::{Bbox, CenterBox},
    category::{Category, CategoryTable, ClassId},
};
pub use annotation::{file::AnnotationFile, record::Annotation};
pub use corpus::{Corpus, CorpusReport};
pub use resolve::{Outcome, Resolution, Resolver, ResolverConfig, ResolverConfigBuilder};
pub use verify::{Verifier, count_overlaps};
