pub mod ai;
pub mod chunker;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod session;

pub use ai::{ApiError, GeminiClient, ModelId};
pub use config::ReviewConfig;
pub use error::{Error, Result};
pub use pipeline::{AnalysisPipeline, Analyzer, NullProgress, Progress};
pub use report::Report;
pub use session::ReviewSession;
