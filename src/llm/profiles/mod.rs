

mod engine;
mod models;
mod prompt;

pub use engine::ProfileDecomposer;
pub use models::{parse_profiles, ProfileList, ProfileParseError};
pub use prompt::{build_profiles_prompt, WORKED_EXAMPLES};
