pub mod gemini;
pub mod openai;
pub mod provider;
pub mod types;

pub use gemini::GeminiGenerator;
pub use openai::OpenAiEmbedder;
pub use provider::{AnswerGenerator, QueryEmbedder};
