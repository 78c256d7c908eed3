pub mod mock;
pub mod prompt;
pub mod vision;

pub use mock::{sample_diseased_tomato, sample_not_a_plant, MockAnalyzer, MockReply};
pub use prompt::{response_schema, DIAGNOSIS_PROMPT, REQUIRED_FIELDS};
pub use vision::{decode_analysis, GeminiAnalyzer, DEFAULT_BASE_URL, DEFAULT_MODEL};
