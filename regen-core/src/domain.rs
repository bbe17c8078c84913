use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the pipeline can validate. Parsing is case-insensitive and
/// accepts the common short forms ("js", "sol").
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Html,
    Css,
    JavaScript,
    Solidity,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::JavaScript => "javascript",
            Self::Solidity => "solidity",
        }
    }

    pub fn all() -> [Language; 4] {
        [Self::Html, Self::Css, Self::JavaScript, Self::Solidity]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
#[error("unsupported language '{0}'")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "css" => Ok(Self::Css),
            "js" | "javascript" => Ok(Self::JavaScript),
            "sol" | "solidity" => Ok(Self::Solidity),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntaxResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SyntaxResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
            warnings: vec![],
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.into()],
            warnings: vec![],
        }
    }
}

/// Verdict of the alignment scorer for one generated candidate.
/// `addresses_problem` is true iff `confidence` reached the acceptance
/// threshold (0.6 by default).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReflectionVerdict {
    pub addresses_problem: bool,
    pub confidence: f32,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Partial alignment ratios, each in [0,1], and the weighted overall score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub action_alignment: f32,
    pub entity_alignment: f32,
    pub technology_alignment: f32,
    pub requirement_alignment: f32,
    pub overall: f32,
    pub missing_elements: Vec<String>,
}

/// One rejected generate -> syntax-check -> reflect cycle. The verdict is
/// absent when the attempt failed syntax before reflection ran.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attempt {
    pub index: u32,
    pub code: String,
    pub syntax: SyntaxResult,
    pub verdict: Option<ReflectionVerdict>,
}

/// Input handed to the generator collaborator each attempt. Built fresh per
/// iteration and never mutated in place, so attempts cannot alias each
/// other's state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationContext {
    pub problem_statement: String,
    pub language: Language,
    /// 1-based attempt counter.
    pub attempt: u32,
    pub previous_attempts: Vec<Attempt>,
    /// Suggestions from the previous attempt's verdict, if any.
    pub feedback: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineResult {
    Success {
        code: String,
        language: Language,
        syntax: SyntaxResult,
        verdict: ReflectionVerdict,
        attempts_used: u32,
        completed_at: chrono::DateTime<chrono::Utc>,
    },
    Failure {
        reason: String,
        last_attempt: Option<Attempt>,
    },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineStats {
    pub languages: usize,
    pub max_attempts: u32,
    pub checkers: usize,
}
