use crate::checkers::delimiter_errors;
use crate::domain::SyntaxResult;
use crate::syntax::SyntaxChecker;

/// Lexical Solidity validator: delimiter balance plus the minimal shape of
/// a source unit (a contract/library/interface, ideally behind a pragma).
pub struct SolidityChecker;

impl SolidityChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SolidityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxChecker for SolidityChecker {
    fn id(&self) -> &str {
        "solidity"
    }

    fn validate(&self, code: &str) -> anyhow::Result<SyntaxResult> {
        if code.trim().is_empty() {
            return Ok(SyntaxResult::invalid("empty input"));
        }

        let mut errors = delimiter_errors(code);
        let mut warnings = Vec::new();

        let has_unit = ["contract ", "library ", "interface ", "abstract contract "]
            .iter()
            .any(|kw| code.contains(kw));
        if !has_unit {
            errors.push("no contract, library, or interface declaration".to_string());
        }

        if !code.contains("pragma solidity") {
            warnings.push("missing 'pragma solidity' version directive".to_string());
        }
        if code.contains("tx.origin") {
            warnings.push("'tx.origin' used for authorization".to_string());
        }

        Ok(SyntaxResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        })
    }
}
