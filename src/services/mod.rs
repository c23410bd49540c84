pub mod metadata;
pub mod providers;
pub mod recommendations;

pub use metadata::MetadataService;
pub use recommendations::{RankedCandidate, RecommendationEngine};
