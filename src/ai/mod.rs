pub mod client;
pub mod credentials;
pub mod http_client;
pub mod models;
pub mod prompts;

pub use client::{ApiError, GeminiClient};
pub use credentials::CredentialManager;
pub use models::{resolve_model, ModelId};
pub use prompts::AnalysisKind;
