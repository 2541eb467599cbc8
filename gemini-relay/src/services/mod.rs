pub mod gemini;
pub mod metrics;

pub use gemini::{GeminiClient, GeminiError};
