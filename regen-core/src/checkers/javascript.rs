use crate::checkers::delimiter_errors;
use crate::domain::SyntaxResult;
use crate::syntax::SyntaxChecker;

/// Lexical JavaScript validator: delimiter balance with string/comment
/// awareness plus a couple of style warnings. Not a parser.
pub struct JavaScriptChecker;

impl JavaScriptChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaScriptChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxChecker for JavaScriptChecker {
    fn id(&self) -> &str {
        "javascript"
    }

    fn validate(&self, code: &str) -> anyhow::Result<SyntaxResult> {
        if code.trim().is_empty() {
            return Ok(SyntaxResult::invalid("empty input"));
        }

        let errors = delimiter_errors(code);
        let mut warnings = Vec::new();

        if code.contains("var ") {
            warnings.push("'var' used; prefer 'let' or 'const'".to_string());
        }
        if code.contains("==") && !code.contains("===") {
            warnings.push("loose equality '==' used; prefer '==='".to_string());
        }

        Ok(SyntaxResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        })
    }
}
