use crate::domain::SyntaxResult;
use crate::syntax::SyntaxChecker;
use regex::Regex;

/// Tag-pairing HTML validator. Checks that non-void elements are closed in
/// order and warns on missing doctype; it does not validate attributes.
pub struct HtmlChecker {
    tag_re: Regex,
    comment_re: Regex,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

impl HtmlChecker {
    pub fn new() -> Self {
        Self {
            tag_re: Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9-]*)([^<>]*?)(/?)>")
                .expect("tag pattern is valid"),
            comment_re: Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"),
        }
    }
}

impl Default for HtmlChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxChecker for HtmlChecker {
    fn id(&self) -> &str {
        "html"
    }

    fn validate(&self, code: &str) -> anyhow::Result<SyntaxResult> {
        if code.trim().is_empty() {
            return Ok(SyntaxResult::invalid("empty input"));
        }

        // Strip comments first so commented-out markup is not paired.
        let stripped = self.comment_re.replace_all(code, "");

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut stack: Vec<String> = Vec::new();

        for cap in self.tag_re.captures_iter(&stripped) {
            let closing = &cap[1] == "/";
            let name = cap[2].to_lowercase();
            let self_closing = &cap[4] == "/";

            if VOID_ELEMENTS.contains(&name.as_str()) || self_closing {
                if closing {
                    warnings.push(format!("void element '{name}' has a closing tag"));
                }
                continue;
            }

            if closing {
                match stack.pop() {
                    Some(open) if open == name => {}
                    Some(open) => {
                        errors.push(format!("expected '</{open}>' but found '</{name}>'"));
                        // Resync: put the unmatched open back unless it pairs
                        // further up the stack.
                        if stack.contains(&name) {
                            while let Some(top) = stack.pop() {
                                if top == name {
                                    break;
                                }
                            }
                        } else {
                            stack.push(open);
                        }
                    }
                    None => errors.push(format!("unexpected closing tag '</{name}>'")),
                }
            } else {
                stack.push(name);
            }
        }

        for open in stack.iter().rev() {
            errors.push(format!("unclosed tag '<{open}>'"));
        }

        let lower = stripped.to_lowercase();
        if lower.contains("<html") && !lower.contains("<!doctype") {
            warnings.push("document is missing a doctype declaration".to_string());
        }

        Ok(SyntaxResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        })
    }
}
