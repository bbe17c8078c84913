use regex::Regex;
use serde::{Deserialize, Serialize};

/// Term tables the keyword extractor matches against. Injectable so the
/// curated defaults can be tuned per domain without touching scorer logic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vocabulary {
    pub actions: Vec<String>,
    pub ui_entities: Vec<String>,
    pub business_entities: Vec<String>,
    pub technologies: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            actions: owned(&[
                "create", "build", "make", "add", "implement", "develop", "design",
                "display", "show", "render", "validate", "verify", "check", "submit",
                "send", "fetch", "get", "update", "edit", "delete", "remove", "store",
                "save", "calculate", "compute", "sort", "filter", "search", "login",
                "register", "authenticate", "upload", "download", "transfer", "mint",
                "deploy", "toggle", "animate", "style", "center", "align",
            ]),
            ui_entities: owned(&[
                "button", "form", "input", "field", "page", "modal", "dialog", "menu",
                "navbar", "navigation", "header", "footer", "sidebar", "card", "table",
                "list", "grid", "gallery", "carousel", "slider", "dropdown", "checkbox",
                "link", "image", "icon", "banner", "layout", "section", "panel", "tab",
            ]),
            business_entities: owned(&[
                "user", "account", "profile", "product", "item", "order", "cart",
                "payment", "invoice", "customer", "message", "comment", "post",
                "article", "task", "todo", "event", "booking", "token", "wallet",
                "contract", "transaction", "balance", "owner", "record", "session",
                "password", "email", "number", "function", "api", "database",
            ]),
            technologies: owned(&[
                "html", "css", "javascript", "typescript", "react", "vue", "angular",
                "svelte", "jquery", "bootstrap", "tailwind", "node", "express",
                "solidity", "ethereum", "erc20", "erc721", "web3", "flexbox", "grid",
                "websocket", "rest", "graphql", "json", "sql",
            ]),
        }
    }
}

/// Concepts a problem statement requires, split into the four categories
/// the alignment ratios are computed over.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProblemKeywords {
    pub actions: Vec<String>,
    pub entities: Vec<String>,
    pub technologies: Vec<String>,
    /// Free-text clauses introduced by a modal verb ("must", "should", ...).
    pub requirements: Vec<String>,
}

impl ProblemKeywords {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
            && self.entities.is_empty()
            && self.technologies.is_empty()
            && self.requirements.is_empty()
    }
}

/// Extract required concepts from a problem statement by vocabulary
/// membership plus a modal-clause scan. Derived purely from the text, so
/// one extraction per run is enough.
pub fn extract_keywords(statement: &str, vocab: &Vocabulary) -> ProblemKeywords {
    let lower = statement.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut keywords = ProblemKeywords::default();

    for action in &vocab.actions {
        if words.contains(&action.as_str()) && !keywords.actions.contains(action) {
            keywords.actions.push(action.clone());
        }
    }

    for entity in vocab.ui_entities.iter().chain(vocab.business_entities.iter()) {
        // Plural forms count: "buttons" requires "button".
        let found = words
            .iter()
            .any(|w| *w == entity.as_str() || w.strip_suffix('s') == Some(entity.as_str()));
        if found && !keywords.entities.contains(entity) {
            keywords.entities.push(entity.clone());
        }
    }

    for tech in &vocab.technologies {
        // Substring match so "node.js" still hits "node".
        if lower.contains(tech.as_str()) && !keywords.technologies.contains(tech) {
            keywords.technologies.push(tech.clone());
        }
    }

    keywords.requirements = extract_requirements(statement);
    keywords
}

fn extract_requirements(statement: &str) -> Vec<String> {
    let re = Regex::new(
        r"(?i)\b(?:must|should|needs? to|has to|have to|required to)\s+([^.;\n]+)",
    )
    .expect("requirement pattern is valid");

    re.captures_iter(statement)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|clause| !clause.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_four_categories() {
        let vocab = Vocabulary::default();
        let kw = extract_keywords(
            "Create a login form with React. The form must validate the email field.",
            &vocab,
        );
        assert!(kw.actions.contains(&"create".to_string()));
        assert!(kw.actions.contains(&"login".to_string()));
        assert!(kw.entities.contains(&"form".to_string()));
        assert!(kw.technologies.contains(&"react".to_string()));
        assert_eq!(kw.requirements, vec!["validate the email field".to_string()]);
    }

    #[test]
    fn plural_entities_match_singular_vocabulary() {
        let vocab = Vocabulary::default();
        let kw = extract_keywords("Display three buttons and two cards", &vocab);
        assert!(kw.entities.contains(&"button".to_string()));
        assert!(kw.entities.contains(&"card".to_string()));
    }

    #[test]
    fn unrecognized_statement_yields_empty_keywords() {
        let vocab = Vocabulary::default();
        let kw = extract_keywords("Lorem ipsum dolor sit amet", &vocab);
        assert!(kw.is_empty());
    }
}
