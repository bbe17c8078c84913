use crate::domain::SyntaxResult;
use crate::syntax::SyntaxChecker;

/// Block-structure CSS validator: rule braces must balance and declarations
/// inside a block need a property:value shape.
pub struct CssChecker;

impl CssChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CssChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxChecker for CssChecker {
    fn id(&self) -> &str {
        "css"
    }

    fn validate(&self, code: &str) -> anyhow::Result<SyntaxResult> {
        if code.trim().is_empty() {
            return Ok(SyntaxResult::invalid("empty input"));
        }

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let mut depth: i32 = 0;
        let mut line = 1usize;
        let mut in_comment = false;
        let mut chars = code.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\n' {
                line += 1;
                continue;
            }
            if in_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    in_comment = false;
                }
                continue;
            }
            match c {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    in_comment = true;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        errors.push(format!("unexpected '}}' on line {line}"));
                        depth = 0;
                    }
                }
                _ => {}
            }
        }
        if depth > 0 {
            errors.push(format!("{depth} unclosed rule block(s)"));
        }

        // Declarations without a colon are almost always typos.
        for (idx, raw) in code.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.ends_with(';')
                && !trimmed.contains(':')
                && !trimmed.starts_with('@')
                && !trimmed.starts_with("/*")
            {
                warnings.push(format!(
                    "declaration on line {} has no ':' separator",
                    idx + 1
                ));
            }
        }

        Ok(SyntaxResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        })
    }
}
