mod css;
mod html;
mod javascript;
mod solidity;

pub use css::CssChecker;
pub use html::HtmlChecker;
pub use javascript::JavaScriptChecker;
pub use solidity::SolidityChecker;

use crate::domain::Language;
use crate::syntax::SyntaxChecker;
use std::collections::HashMap;
use std::sync::Arc;

/// Build the default checker registry, one implementation per language.
pub fn default_checkers() -> HashMap<Language, Arc<dyn SyntaxChecker>> {
    let mut checkers: HashMap<Language, Arc<dyn SyntaxChecker>> = HashMap::new();
    checkers.insert(Language::Html, Arc::new(HtmlChecker::new()));
    checkers.insert(Language::Css, Arc::new(CssChecker::new()));
    checkers.insert(Language::JavaScript, Arc::new(JavaScriptChecker::new()));
    checkers.insert(Language::Solidity, Arc::new(SolidityChecker::new()));
    checkers
}

/// Delimiter balance scan for C-like syntax, skipping string literals and
/// comments so braces inside them are not counted.
pub(crate) fn delimiter_errors(code: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = code.char_indices().peekable();
    let mut line = 1usize;

    #[derive(PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(char),
    }
    let mut state = State::Code;

    while let Some((_, c)) = chars.next() {
        if c == '\n' {
            line += 1;
            if state == State::LineComment {
                state = State::Code;
            }
            continue;
        }
        match state {
            State::Code => match c {
                '/' => {
                    if let Some((_, next)) = chars.peek() {
                        if *next == '/' {
                            state = State::LineComment;
                            chars.next();
                        } else if *next == '*' {
                            state = State::BlockComment;
                            chars.next();
                        }
                    }
                }
                '"' | '\'' | '`' => state = State::Str(c),
                '(' | '[' | '{' => stack.push((c, line)),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match stack.pop() {
                        Some((open, _)) if open == expected => {}
                        Some((open, open_line)) => errors.push(format!(
                            "mismatched '{c}' on line {line}; '{open}' opened on line {open_line} is still unclosed"
                        )),
                        None => errors.push(format!("unexpected '{c}' on line {line}")),
                    }
                }
                _ => {}
            },
            State::BlockComment => {
                if c == '*' {
                    if let Some((_, '/')) = chars.peek() {
                        chars.next();
                        state = State::Code;
                    }
                }
            }
            State::Str(quote) => {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    state = State::Code;
                }
            }
            State::LineComment => {}
        }
    }

    for (open, open_line) in stack {
        errors.push(format!("unclosed '{open}' opened on line {open_line}"));
    }
    errors
}
