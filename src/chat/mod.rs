mod pipeline;
mod prompt;
mod question;

pub use pipeline::{ChatOutcome, ChatPipeline, PipelineStage};
pub use prompt::build_prompt;
pub use question::{validate_request, Question};
