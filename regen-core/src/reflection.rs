use crate::domain::{AlignmentReport, Language, ReflectionVerdict};
use crate::features::{extract_features, CodeFeatures};
use crate::keywords::{extract_keywords, ProblemKeywords, Vocabulary};
use serde::{Deserialize, Serialize};

/// Relative weight of each partial ratio in the overall score. The defaults
/// reflect that what the code does and what it operates on matter more than
/// which technology is named or verbatim requirement phrasing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AlignmentWeights {
    pub action: f32,
    pub entity: f32,
    pub technology: f32,
    pub requirement: f32,
}

impl Default for AlignmentWeights {
    fn default() -> Self {
        Self {
            action: 0.3,
            entity: 0.3,
            technology: 0.2,
            requirement: 0.2,
        }
    }
}

pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Surface forms that count as an implementation of an action verb.
const ACTION_SYNONYMS: &[(&str, &[&str])] = &[
    ("create", &["new ", "create", "add", "insert", "post"]),
    ("build", &["create", "new ", "construct", "render"]),
    ("make", &["create", "new ", "function", "build"]),
    ("display", &["render", "show", "innerhtml", "append", "print"]),
    ("show", &["display", "render", "visible", "innerhtml"]),
    ("validate", &["check", "verify", "test", "require", "pattern"]),
    ("verify", &["check", "validate", "require", "assert"]),
    ("check", &["validate", "verify", "if ", "test"]),
    ("submit", &["submit", "post", "send", "onsubmit"]),
    ("send", &["post", "submit", "emit", "transfer", "send"]),
    ("fetch", &["fetch", "axios", "get", "request", "load"]),
    ("get", &["fetch", "get", "read", "select", "return"]),
    ("update", &["update", "set", "edit", "patch", "modify"]),
    ("edit", &["update", "edit", "modify", "change"]),
    ("delete", &["delete", "remove", "splice", "drop", "destroy"]),
    ("remove", &["delete", "remove", "splice", "pop"]),
    ("store", &["store", "save", "localstorage", "insert", "push"]),
    ("save", &["save", "store", "write", "persist", "insert"]),
    ("calculate", &["calculate", "compute", "sum", "total", "math."]),
    ("compute", &["calculate", "compute", "sum", "math."]),
    ("sort", &["sort", "order", "compare"]),
    ("filter", &["filter", "find", "match", "where"]),
    ("search", &["search", "find", "filter", "query", "match"]),
    ("login", &["login", "signin", "auth", "session", "password"]),
    ("register", &["register", "signup", "create", "account"]),
    ("authenticate", &["auth", "login", "token", "session", "verify"]),
    ("upload", &["upload", "file", "formdata", "multipart"]),
    ("download", &["download", "blob", "export", "save"]),
    ("transfer", &["transfer", "send", "balance", "move"]),
    ("mint", &["mint", "_mint", "create", "issue"]),
    ("deploy", &["deploy", "constructor", "contract"]),
    ("toggle", &["toggle", "classlist", "switch", "checked"]),
    ("animate", &["animate", "animation", "transition", "keyframes"]),
    ("style", &["style", "css", "class", "color"]),
    ("center", &["center", "margin: auto", "justify-content", "align-items"]),
    ("align", &["align", "justify", "flex", "grid"]),
];

fn synonyms_for(action: &str) -> Option<&'static [&'static str]> {
    ACTION_SYNONYMS
        .iter()
        .find(|(a, _)| *a == action)
        .map(|(_, forms)| *forms)
}

/// The alignment scorer: a soft heuristic estimating whether generated code
/// is topically and structurally responsive to the problem statement. It
/// proves nothing about correctness.
#[derive(Clone, Debug)]
pub struct AlignmentScorer {
    pub vocabulary: Vocabulary,
    pub weights: AlignmentWeights,
    pub threshold: f32,
}

impl Default for AlignmentScorer {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            weights: AlignmentWeights::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl AlignmentScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            ..Self::default()
        }
    }

    /// Pure function of its inputs. Never panics and never surfaces an
    /// error: any internal failure degrades to a zero-confidence verdict
    /// carrying the failure reason as its single issue.
    pub fn analyze(&self, problem: &str, code: &str, language: Language) -> ReflectionVerdict {
        match self.try_analyze(problem, code, language) {
            Ok(verdict) => verdict,
            Err(e) => ReflectionVerdict {
                addresses_problem: false,
                confidence: 0.0,
                issues: vec![format!("analysis failed: {e}")],
                suggestions: vec![],
            },
        }
    }

    fn try_analyze(
        &self,
        problem: &str,
        code: &str,
        language: Language,
    ) -> anyhow::Result<ReflectionVerdict> {
        let keywords = extract_keywords(problem, &self.vocabulary);
        let features = extract_features(code, language, &self.vocabulary);
        let report = self.score(&keywords, &features, code);

        anyhow::ensure!(
            report.overall.is_finite(),
            "alignment score is not finite; check the scorer weights"
        );

        let confidence = report.overall.clamp(0.0, 1.0);
        let addresses_problem = confidence >= self.threshold;

        let (issues, suggestions) = if addresses_problem {
            (vec![], vec![])
        } else {
            (
                self.collect_issues(&report),
                self.collect_suggestions(&report, &keywords, &features, language),
            )
        };

        Ok(ReflectionVerdict {
            addresses_problem,
            confidence,
            issues,
            suggestions,
        })
    }

    /// Compute the four partial ratios and their weighted combination.
    /// Each ratio defaults to 1 when its category extracted nothing, so an
    /// unrecognizable statement is accepted rather than rejected.
    pub fn score(
        &self,
        keywords: &ProblemKeywords,
        features: &CodeFeatures,
        code: &str,
    ) -> AlignmentReport {
        let code_lower = code.to_lowercase();
        let mut missing = Vec::new();

        let action_alignment = ratio_or_default(&keywords.actions, |action| {
            let found = action_implemented(action, &code_lower);
            if !found {
                missing.push(format!("action '{action}' not implemented"));
            }
            found
        });

        let entity_alignment = ratio_or_default(&keywords.entities, |entity| {
            let found = code_lower.contains(entity.as_str())
                || features.ui_elements.iter().any(|e| e.contains(entity.as_str()))
                || features.classes.iter().any(|c| c.to_lowercase().contains(entity.as_str()))
                || features.contracts.iter().any(|c| c.to_lowercase().contains(entity.as_str()));
            if !found {
                missing.push(format!("entity '{entity}' not found"));
            }
            found
        });

        let technology_alignment = ratio_or_default(&keywords.technologies, |tech| {
            let found = features.frameworks.iter().any(|f| f.contains(tech.as_str()));
            if !found {
                missing.push(format!("technology '{tech}' not detected"));
            }
            found
        });

        let requirement_alignment = ratio_or_default(&keywords.requirements, |clause| {
            let fulfilled = requirement_fulfilled(clause, &code_lower);
            if !fulfilled {
                missing.push(format!("requirement not met: '{clause}'"));
            }
            fulfilled
        });

        let overall = self.weights.action * action_alignment
            + self.weights.entity * entity_alignment
            + self.weights.technology * technology_alignment
            + self.weights.requirement * requirement_alignment;

        AlignmentReport {
            action_alignment,
            entity_alignment,
            technology_alignment,
            requirement_alignment,
            overall,
            missing_elements: missing,
        }
    }

    fn collect_issues(&self, report: &AlignmentReport) -> Vec<String> {
        let mut issues = Vec::new();
        if report.action_alignment < 0.5 {
            issues.push("most required actions are not implemented".to_string());
        }
        if report.entity_alignment < 0.5 {
            issues.push("most required entities are absent from the code".to_string());
        }
        if report.technology_alignment < 0.3 {
            issues.push("required technologies are not used".to_string());
        }
        if report.requirement_alignment < 0.4 {
            issues.push("stated requirements are largely unaddressed".to_string());
        }
        if report.missing_elements.len() > 3 {
            issues.push(format!(
                "{} required elements are missing",
                report.missing_elements.len()
            ));
        }
        issues
    }

    fn collect_suggestions(
        &self,
        report: &AlignmentReport,
        keywords: &ProblemKeywords,
        features: &CodeFeatures,
        language: Language,
    ) -> Vec<String> {
        let mut suggestions = Vec::new();

        if report.action_alignment < 1.0 {
            let code_oriented =
                matches!(language, Language::JavaScript | Language::Solidity);
            if code_oriented && features.functions.is_empty() {
                suggestions.push(
                    "add functions implementing the required behavior".to_string(),
                );
            } else {
                suggestions.push(format!(
                    "implement the requested actions: {}",
                    keywords.actions.join(", ")
                ));
            }
        }
        if report.entity_alignment < 1.0 {
            suggestions.push(format!(
                "include the elements the problem refers to: {}",
                keywords.entities.join(", ")
            ));
        }
        if report.technology_alignment < 1.0 {
            suggestions.push(format!(
                "use the required technologies: {}",
                keywords.technologies.join(", ")
            ));
        }
        if report.requirement_alignment < 1.0 {
            suggestions.push("address the stated 'must'/'should' requirements".to_string());
        }
        suggestions
    }
}

fn ratio_or_default<T>(required: &[T], mut found: impl FnMut(&T) -> bool) -> f32 {
    if required.is_empty() {
        return 1.0;
    }
    let hits = required.iter().filter(|item| found(item)).count();
    hits as f32 / required.len() as f32
}

fn action_implemented(action: &str, code_lower: &str) -> bool {
    if code_lower.contains(action) {
        return true;
    }
    // Short morphological variants: "sorted", "sorting", "creates".
    let stem = action.strip_suffix('e').unwrap_or(action);
    for suffix in ["s", "ed", "ing"] {
        if code_lower.contains(&format!("{stem}{suffix}")) {
            return true;
        }
    }
    synonyms_for(action)
        .map(|forms| forms.iter().any(|f| code_lower.contains(f)))
        .unwrap_or(false)
}

/// A requirement clause counts as fulfilled when at least half of its
/// significant words (longer than 3 characters) appear in the code.
fn requirement_fulfilled(clause: &str, code_lower: &str) -> bool {
    let words: Vec<String> = clause
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(|w| w.to_string())
        .collect();
    if words.is_empty() {
        return true;
    }
    let present = words.iter().filter(|w| code_lower.contains(w.as_str())).count();
    present * 2 >= words.len()
}
