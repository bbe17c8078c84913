use crate::checkers::default_checkers;
use crate::domain::{
    Attempt, GenerationContext, Language, PipelineResult, PipelineStats, SyntaxResult,
};
use crate::generator::CodeGenerator;
use crate::logging::{LogEvent, LogLevel, NoopEventLogger, SharedEventLogger};
use crate::metrics::{InMemoryMetrics, Metrics};
use crate::reflection::AlignmentScorer;
use crate::syntax::SyntaxChecker;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The regeneration orchestrator. Drives the attempt loop for one problem
/// statement: generate, syntax-check, reflect, then accept, retry with
/// feedback, or give up at the attempt ceiling.
///
/// All per-run state lives on the stack of `run`, so one `Pipeline` can
/// serve concurrent runs as long as the generator is itself safe to share.
pub struct Pipeline {
    checkers: HashMap<Language, Arc<dyn SyntaxChecker>>,
    scorer: AlignmentScorer,
    max_attempts: u32,
    metrics: Arc<dyn Metrics>,
    logger: SharedEventLogger,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            checkers: default_checkers(),
            scorer: AlignmentScorer::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            metrics: Arc::new(InMemoryMetrics::new()),
            logger: Arc::new(NoopEventLogger),
        }
    }

    pub fn with_logger(mut self, logger: SharedEventLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_scorer(mut self, scorer: AlignmentScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Register or replace the syntax checker for a language.
    pub fn with_checker(mut self, language: Language, checker: Arc<dyn SyntaxChecker>) -> Self {
        self.checkers.insert(language, checker);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn set_max_attempts(&mut self, max_attempts: u32) -> anyhow::Result<()> {
        if max_attempts == 0 {
            anyhow::bail!("max attempts must be positive");
        }
        self.max_attempts = max_attempts;
        Ok(())
    }

    pub fn supported_languages(&self) -> Vec<Language> {
        Language::all()
            .into_iter()
            .filter(|l| self.checkers.contains_key(l))
            .collect()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            languages: self.supported_languages().len(),
            max_attempts: self.max_attempts,
            checkers: self.checkers.len(),
        }
    }

    /// Run the full pipeline for one problem statement. Every failure mode
    /// normalizes to `PipelineResult::Failure`; callers never see an error
    /// for ordinary validation or regeneration flow.
    pub async fn run(
        &self,
        problem_statement: &str,
        language: &str,
        generator: &dyn CodeGenerator,
    ) -> PipelineResult {
        let run_id = format!("run-{}", chrono::Utc::now().timestamp_millis());
        self.metrics.inc_run_started();

        // Precondition checks consume zero attempts.
        if problem_statement.trim().is_empty() {
            return self.reject_input(&run_id, "problem statement is empty");
        }
        let language: Language = match language.parse() {
            Ok(l) => l,
            Err(e) => return self.reject_input(&run_id, &e.to_string()),
        };
        let Some(checker) = self.checkers.get(&language) else {
            return self.reject_input(
                &run_id,
                &format!("no syntax checker registered for '{language}'"),
            );
        };

        self.logger.log(
            LogEvent::new(LogLevel::Info, "pipeline.run.started")
                .with_run(run_id.clone())
                .with_field("language", language.to_string())
                .with_field("max_attempts", self.max_attempts.to_string()),
        );

        let mut history: Vec<Attempt> = Vec::new();
        let mut feedback: Vec<String> = Vec::new();

        for attempt in 1..=self.max_attempts {
            self.metrics.inc_attempt_started();
            self.logger.log(
                LogEvent::new(LogLevel::Debug, "pipeline.attempt.started")
                    .with_run(run_id.clone())
                    .with_attempt(attempt),
            );

            // History and feedback are cloned into a fresh context so the
            // generator never holds a reference into the loop's state.
            let ctx = GenerationContext {
                problem_statement: problem_statement.to_string(),
                language,
                attempt,
                previous_attempts: history.clone(),
                feedback: feedback.clone(),
            };

            let code = match generator.generate(&ctx).await {
                Ok(code) if !code.trim().is_empty() => code,
                Ok(_) => {
                    let record = generation_failure_attempt(attempt, "generator returned empty output");
                    self.logger.log(
                        LogEvent::new(LogLevel::Warn, "pipeline.attempt.generation_failed")
                            .with_run(run_id.clone())
                            .with_attempt(attempt)
                            .with_field("reason", "empty output".to_string()),
                    );
                    if attempt == self.max_attempts {
                        return self.exhausted(
                            &run_id,
                            format!(
                                "generation failed after {} attempt(s): generator returned empty output",
                                self.max_attempts
                            ),
                            record,
                        );
                    }
                    history.push(record);
                    continue;
                }
                Err(e) => {
                    let record =
                        generation_failure_attempt(attempt, &format!("generation failed: {e}"));
                    self.logger.log(
                        LogEvent::new(LogLevel::Warn, "pipeline.attempt.generation_failed")
                            .with_run(run_id.clone())
                            .with_attempt(attempt)
                            .with_field("error", e.to_string()),
                    );
                    if attempt == self.max_attempts {
                        return self.exhausted(
                            &run_id,
                            format!(
                                "generation failed after {} attempt(s): {e}",
                                self.max_attempts
                            ),
                            record,
                        );
                    }
                    history.push(record);
                    continue;
                }
            };

            // A checker error is folded into an invalid result instead of
            // propagating out of the run.
            let syntax = match checker.validate(&code) {
                Ok(result) => result,
                Err(e) => SyntaxResult::invalid(format!("syntax checker failed: {e}")),
            };

            if !syntax.is_valid {
                self.metrics.record_syntax_fail();
                self.logger.log(
                    LogEvent::new(LogLevel::Info, "pipeline.attempt.syntax_failed")
                        .with_run(run_id.clone())
                        .with_attempt(attempt)
                        .with_field("errors", syntax.errors.join("; ")),
                );
                let record = Attempt {
                    index: attempt,
                    code,
                    syntax,
                    verdict: None,
                };
                if attempt == self.max_attempts {
                    return self.exhausted(
                        &run_id,
                        format!(
                            "syntax validation failed after {} attempt(s)",
                            self.max_attempts
                        ),
                        record,
                    );
                }
                // Suggestions from an earlier verdict refer to earlier code;
                // do not carry them past a syntax failure.
                feedback.clear();
                history.push(record);
                continue;
            }
            self.metrics.record_syntax_pass();

            let verdict = self
                .scorer
                .analyze(problem_statement, &code, language);

            if verdict.addresses_problem {
                self.metrics.record_reflection_pass();
                self.metrics.inc_run_succeeded();
                self.logger.log(
                    LogEvent::new(LogLevel::Info, "pipeline.run.accepted")
                        .with_run(run_id.clone())
                        .with_attempt(attempt)
                        .with_field("confidence", format!("{:.2}", verdict.confidence)),
                );
                return PipelineResult::Success {
                    code,
                    language,
                    syntax,
                    verdict,
                    attempts_used: attempt,
                    completed_at: chrono::Utc::now(),
                };
            }

            self.metrics.record_reflection_fail();
            self.logger.log(
                LogEvent::new(LogLevel::Info, "pipeline.attempt.reflection_rejected")
                    .with_run(run_id.clone())
                    .with_attempt(attempt)
                    .with_field("confidence", format!("{:.2}", verdict.confidence))
                    .with_field("issues", verdict.issues.join("; ")),
            );

            feedback = verdict.suggestions.clone();
            let record = Attempt {
                index: attempt,
                code,
                syntax,
                verdict: Some(verdict),
            };
            if attempt == self.max_attempts {
                return self.exhausted(
                    &run_id,
                    format!(
                        "generated code did not address the problem after {} attempt(s)",
                        self.max_attempts
                    ),
                    record,
                );
            }
            history.push(record);
        }

        // The loop always returns from its final iteration.
        unreachable!("attempt loop exited without a result")
    }

    fn reject_input(&self, run_id: &str, reason: &str) -> PipelineResult {
        self.metrics.inc_run_failed();
        self.logger.log(
            LogEvent::new(LogLevel::Warn, "pipeline.run.rejected_input")
                .with_run(run_id.to_string())
                .with_field("reason", reason.to_string()),
        );
        PipelineResult::Failure {
            reason: reason.to_string(),
            last_attempt: None,
        }
    }

    fn exhausted(&self, run_id: &str, reason: String, last_attempt: Attempt) -> PipelineResult {
        self.metrics.inc_run_failed();
        self.logger.log(
            LogEvent::new(LogLevel::Warn, "pipeline.run.exhausted")
                .with_run(run_id.to_string())
                .with_attempt(last_attempt.index)
                .with_field("reason", reason.clone()),
        );
        PipelineResult::Failure {
            reason,
            last_attempt: Some(last_attempt),
        }
    }
}

/// A generator error or empty output consumes its attempt. The record
/// carries the failure as a synthetic syntax result so exhausted runs still
/// surface what went wrong.
fn generation_failure_attempt(index: u32, reason: &str) -> Attempt {
    Attempt {
        index,
        code: String::new(),
        syntax: SyntaxResult::invalid(reason),
        verdict: None,
    }
}
