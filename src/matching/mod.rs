

pub mod aggregate;
pub mod ingest;
pub mod models;
pub mod sentences;

pub use aggregate::{select_top_k, ExpertAggregator, MatchPolicy};
pub use ingest::SkillIngestor;
pub use models::{ExpertMatch, IngestOutcome, IngestReport, ProfileRecommendation, Recommendation};
pub use sentences::segment_sentences;
