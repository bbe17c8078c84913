use crate::domain::Language;
use crate::keywords::Vocabulary;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Observable structure of one generated candidate: named declarations,
/// detected frameworks, UI elements, and architectural patterns.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CodeFeatures {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub contracts: Vec<String>,
    pub frameworks: Vec<String>,
    pub ui_elements: Vec<String>,
    pub patterns: Vec<String>,
}

impl CodeFeatures {
    fn push_unique(list: &mut Vec<String>, value: impl Into<String>) {
        let value = value.into();
        if !list.contains(&value) {
            list.push(value);
        }
    }
}

/// One structural scanner per language. The generic cross-language pass is
/// applied on top of whatever the specific scanner found.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, code: &str) -> CodeFeatures;
}

struct HtmlExtractor;
struct CssExtractor;
struct JavaScriptExtractor;
struct SolidityExtractor;

const HTML_UI_TAGS: &[&str] = &[
    "button", "form", "input", "select", "textarea", "table", "nav", "header",
    "footer", "section", "article", "aside", "dialog", "menu", "img", "a", "ul",
];

impl FeatureExtractor for HtmlExtractor {
    fn extract(&self, code: &str) -> CodeFeatures {
        let mut features = CodeFeatures::default();
        let lower = code.to_lowercase();

        for tag in HTML_UI_TAGS {
            if lower.contains(&format!("<{tag}")) {
                CodeFeatures::push_unique(&mut features.ui_elements, *tag);
            }
        }

        if lower.contains("viewport") || lower.contains("@media") {
            CodeFeatures::push_unique(&mut features.patterns, "responsive");
        }
        if lower.contains("bootstrap") {
            CodeFeatures::push_unique(&mut features.frameworks, "bootstrap");
        }
        if lower.contains("tailwind") {
            CodeFeatures::push_unique(&mut features.frameworks, "tailwind");
        }
        if lower.contains("<script") {
            CodeFeatures::push_unique(&mut features.frameworks, "javascript");
        }
        if lower.contains("<style") || lower.contains("stylesheet") {
            CodeFeatures::push_unique(&mut features.frameworks, "css");
        }
        features
    }
}

impl FeatureExtractor for CssExtractor {
    fn extract(&self, code: &str) -> CodeFeatures {
        let mut features = CodeFeatures::default();
        let lower = code.to_lowercase();

        if lower.contains("@media") {
            CodeFeatures::push_unique(&mut features.patterns, "responsive");
        }
        if lower.contains("display: flex") || lower.contains("display:flex") {
            CodeFeatures::push_unique(&mut features.frameworks, "flexbox");
        }
        if lower.contains("display: grid") || lower.contains("display:grid") {
            CodeFeatures::push_unique(&mut features.frameworks, "grid");
        }
        if lower.contains("animation") || lower.contains("transition") {
            CodeFeatures::push_unique(&mut features.patterns, "animation");
        }

        // Class selectors often name the UI concept they style.
        let selector_re = Regex::new(r"\.([a-zA-Z][\w-]*)\s*\{").expect("selector pattern");
        for cap in selector_re.captures_iter(&lower) {
            CodeFeatures::push_unique(&mut features.ui_elements, &cap[1]);
        }
        features
    }
}

impl FeatureExtractor for JavaScriptExtractor {
    fn extract(&self, code: &str) -> CodeFeatures {
        let mut features = CodeFeatures::default();
        let lower = code.to_lowercase();

        let fn_decl = Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)").expect("fn pattern");
        for cap in fn_decl.captures_iter(code) {
            CodeFeatures::push_unique(&mut features.functions, &cap[1]);
        }
        let fn_expr = Regex::new(
            r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\()",
        )
        .expect("fn expr pattern");
        for cap in fn_expr.captures_iter(code) {
            CodeFeatures::push_unique(&mut features.functions, &cap[1]);
        }
        let class_decl = Regex::new(r"\bclass\s+([A-Za-z_$][\w$]*)").expect("class pattern");
        for cap in class_decl.captures_iter(code) {
            CodeFeatures::push_unique(&mut features.classes, &cap[1]);
        }

        if lower.contains("react") || lower.contains("usestate") || lower.contains("useeffect") {
            CodeFeatures::push_unique(&mut features.frameworks, "react");
        }
        if lower.contains("require('express')") || lower.contains("require(\"express\")") {
            CodeFeatures::push_unique(&mut features.frameworks, "express");
        }
        if lower.contains("$(") || lower.contains("jquery") {
            CodeFeatures::push_unique(&mut features.frameworks, "jquery");
        }
        if lower.contains("document.queryselector") || lower.contains("getelementbyid") {
            CodeFeatures::push_unique(&mut features.patterns, "dom-manipulation");
        }
        if lower.contains("addeventlistener") || lower.contains("onclick") {
            CodeFeatures::push_unique(&mut features.patterns, "event-handling");
        }
        features
    }
}

impl FeatureExtractor for SolidityExtractor {
    fn extract(&self, code: &str) -> CodeFeatures {
        let mut features = CodeFeatures::default();
        let lower = code.to_lowercase();

        let contract_re = Regex::new(r"\bcontract\s+([A-Za-z_]\w*)").expect("contract pattern");
        for cap in contract_re.captures_iter(code) {
            CodeFeatures::push_unique(&mut features.contracts, &cap[1]);
        }
        let fn_re = Regex::new(r"\bfunction\s+([A-Za-z_]\w*)").expect("fn pattern");
        for cap in fn_re.captures_iter(code) {
            CodeFeatures::push_unique(&mut features.functions, &cap[1]);
        }

        if lower.contains("erc20") {
            CodeFeatures::push_unique(&mut features.frameworks, "erc20");
        }
        if lower.contains("erc721") {
            CodeFeatures::push_unique(&mut features.frameworks, "erc721");
        }
        if lower.contains("onlyowner") || lower.contains("require(msg.sender") {
            CodeFeatures::push_unique(&mut features.patterns, "access-control");
        }
        if lower.contains("payable") || lower.contains("msg.value") {
            CodeFeatures::push_unique(&mut features.patterns, "payments");
        }
        if lower.contains("mapping(") || lower.contains("mapping (") {
            CodeFeatures::push_unique(&mut features.patterns, "storage-mapping");
        }
        features
    }
}

fn extractor_for(language: Language) -> &'static dyn FeatureExtractor {
    match language {
        Language::Html => &HtmlExtractor,
        Language::Css => &CssExtractor,
        Language::JavaScript => &JavaScriptExtractor,
        Language::Solidity => &SolidityExtractor,
    }
}

/// Extract features for one candidate: the language-specific scan followed
/// by the generic cross-language pass.
pub fn extract_features(code: &str, language: Language, vocab: &Vocabulary) -> CodeFeatures {
    let mut features = extractor_for(language).extract(code);
    apply_generic_pass(&mut features, code, vocab);
    features
}

/// Cross-language indicators scanned on the lower-cased text. The "db" and
/// CRUD hints are plain substrings and match inside longer identifiers.
fn apply_generic_pass(features: &mut CodeFeatures, code: &str, vocab: &Vocabulary) {
    let lower = code.to_lowercase();

    let auth_hints = ["login", "password", "auth", "session", "signin", "sign-in"];
    if auth_hints.iter().any(|h| lower.contains(h)) {
        CodeFeatures::push_unique(&mut features.patterns, "authentication");
    }

    let crud_hints = ["create", "insert", "update", "delete", "remove", "save"];
    if crud_hints.iter().any(|h| lower.contains(h)) {
        CodeFeatures::push_unique(&mut features.patterns, "crud");
    }

    let api_hints = ["fetch(", "axios", "xmlhttprequest", "endpoint", "api", "http"];
    if api_hints.iter().any(|h| lower.contains(h)) {
        CodeFeatures::push_unique(&mut features.patterns, "api");
    }

    let db_hints = ["db", "database", "sql", "query", "mongo", "collection"];
    if db_hints.iter().any(|h| lower.contains(h)) {
        CodeFeatures::push_unique(&mut features.patterns, "database");
    }

    // Any vocabulary technology that appears verbatim counts as detected,
    // so the technology ratio sees plain mentions as well as imports.
    for tech in &vocab.technologies {
        if lower.contains(tech.as_str()) {
            CodeFeatures::push_unique(&mut features.frameworks, tech.clone());
        }
    }
}
