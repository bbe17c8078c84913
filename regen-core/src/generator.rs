use crate::domain::GenerationContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorMetadata {
    pub id: String,
    pub name: String,
    pub model: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
    #[error("transport error")]
    Transport,
    #[error("request timed out")]
    Timeout,
    #[error("invalid response")]
    InvalidResponse,
    #[error("generator unavailable")]
    Unavailable,
    #[error("{0}")]
    Critical(String),
}

/// External capability that produces candidate code for a problem statement.
///
/// May suspend for the duration of the external generation. An `Err`, like
/// an empty result, fails the current attempt without aborting the run.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    fn metadata(&self) -> GeneratorMetadata;

    async fn generate(&self, ctx: &GenerationContext) -> Result<String, GeneratorError>;
}
