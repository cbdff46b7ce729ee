// Declare submodules
mod common;
mod few_shot;
mod filter;

pub use common::{ANSWER_MARKER, QUERY_MARKER};
pub use few_shot::{FewShotExample, FEW_SHOT_EXAMPLES};
pub use filter::filter_extraction_prompt;
