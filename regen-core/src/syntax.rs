use crate::domain::SyntaxResult;

/// External capability that validates code text for one language.
///
/// Implementations should report parse problems through the returned
/// `SyntaxResult` and reserve `Err` for internal failures; the pipeline
/// converts an `Err` into an invalid result rather than propagating it.
pub trait SyntaxChecker: Send + Sync {
    fn id(&self) -> &str;
    fn validate(&self, code: &str) -> anyhow::Result<SyntaxResult>;
}
