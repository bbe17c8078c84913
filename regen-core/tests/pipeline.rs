use async_trait::async_trait;
use regen_core::domain::{GenerationContext, Language, PipelineResult, SyntaxResult};
use regen_core::generator::{CodeGenerator, GeneratorError, GeneratorMetadata};
use regen_core::metrics::{InMemoryMetrics, Metrics};
use regen_core::pipeline::Pipeline;
use regen_core::syntax::SyntaxChecker;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Generator that replays a fixed script of outputs, one per attempt, and
/// records the context it was called with.
struct ScriptedGenerator {
    outputs: Vec<Result<String, GeneratorError>>,
    calls: AtomicU32,
    seen_contexts: Mutex<Vec<GenerationContext>>,
}

impl ScriptedGenerator {
    fn new(outputs: Vec<Result<String, GeneratorError>>) -> Self {
        Self {
            outputs,
            calls: AtomicU32::new(0),
            seen_contexts: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeGenerator for ScriptedGenerator {
    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata {
            id: "scripted".to_string(),
            name: "ScriptedGenerator".to_string(),
            model: None,
        }
    }

    async fn generate(&self, ctx: &GenerationContext) -> Result<String, GeneratorError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        self.seen_contexts.lock().unwrap().push(ctx.clone());
        match self.outputs.get(idx) {
            Some(Ok(code)) => Ok(code.clone()),
            Some(Err(GeneratorError::Critical(msg))) => {
                Err(GeneratorError::Critical(msg.clone()))
            }
            Some(Err(GeneratorError::Timeout)) => Err(GeneratorError::Timeout),
            Some(Err(_)) => Err(GeneratorError::Transport),
            None => panic!("generator called more often than scripted"),
        }
    }
}

const SUM_FUNCTION: &str = "function calculateSum(a, b) {\n  return a + b;\n}";

#[tokio::test]
async fn valid_aligned_code_is_accepted_on_first_attempt() {
    let pipeline = Pipeline::new();
    let generator = ScriptedGenerator::new(vec![Ok(SUM_FUNCTION.to_string())]);

    let result = pipeline
        .run(
            "Create a function to calculate the sum of two numbers",
            "javascript",
            &generator,
        )
        .await;

    match result {
        PipelineResult::Success {
            attempts_used,
            verdict,
            syntax,
            ..
        } => {
            assert_eq!(attempts_used, 1);
            assert!(syntax.is_valid);
            assert!(verdict.addresses_problem);
            assert!(verdict.confidence >= 0.6);
        }
        PipelineResult::Failure { reason, .. } => panic!("expected success, got: {reason}"),
    }
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn recovers_over_three_attempts_with_history_visible() {
    let pipeline = Pipeline::new();
    let generator = ScriptedGenerator::new(vec![
        // Unbalanced braces: fails syntax.
        Ok("function broken( {".to_string()),
        // Parses but addresses nothing.
        Ok("console.log('hello world');".to_string()),
        Ok(SUM_FUNCTION.to_string()),
    ]);

    let result = pipeline
        .run(
            "Create a function to calculate the sum of two numbers",
            "javascript",
            &generator,
        )
        .await;

    match result {
        PipelineResult::Success { attempts_used, .. } => assert_eq!(attempts_used, 3),
        PipelineResult::Failure { reason, .. } => panic!("expected success, got: {reason}"),
    }
    assert_eq!(generator.call_count(), 3);

    let contexts = generator.seen_contexts.lock().unwrap();
    assert_eq!(contexts[0].attempt, 1);
    assert!(contexts[0].previous_attempts.is_empty());
    assert_eq!(contexts[1].previous_attempts.len(), 1);
    // Attempt 1 failed syntax, so no verdict was recorded for it.
    assert!(contexts[1].previous_attempts[0].verdict.is_none());
    assert_eq!(contexts[2].attempt, 3);
    assert_eq!(contexts[2].previous_attempts.len(), 2);
    // Attempt 2 was rejected by reflection; its verdict and suggestions
    // must be visible to attempt 3.
    assert!(contexts[2].previous_attempts[1].verdict.is_some());
    assert!(!contexts[2].feedback.is_empty());
}

#[tokio::test]
async fn unparsable_output_exhausts_attempts() {
    let mut pipeline = Pipeline::new();
    pipeline.set_max_attempts(2).unwrap();
    let generator = ScriptedGenerator::new(vec![
        Ok("function broken( {".to_string()),
        Ok("function broken( {".to_string()),
    ]);

    let result = pipeline
        .run("Create a function", "javascript", &generator)
        .await;

    match result {
        PipelineResult::Failure {
            reason,
            last_attempt,
        } => {
            assert!(reason.contains("syntax"), "unexpected reason: {reason}");
            let last = last_attempt.expect("exhausted run carries its last attempt");
            assert_eq!(last.index, 2);
            assert!(!last.syntax.is_valid);
        }
        PipelineResult::Success { .. } => panic!("expected failure"),
    }
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn unsupported_language_fails_without_generating() {
    let pipeline = Pipeline::new();
    let generator = ScriptedGenerator::new(vec![]);

    let result = pipeline
        .run("Create a report module", "cobol", &generator)
        .await;

    match result {
        PipelineResult::Failure {
            reason,
            last_attempt,
        } => {
            assert!(reason.contains("cobol"));
            assert!(last_attempt.is_none());
        }
        PipelineResult::Success { .. } => panic!("expected failure"),
    }
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn empty_problem_statement_fails_without_generating() {
    let pipeline = Pipeline::new();
    let generator = ScriptedGenerator::new(vec![]);

    let result = pipeline.run("   ", "javascript", &generator).await;

    assert!(matches!(
        result,
        PipelineResult::Failure {
            last_attempt: None,
            ..
        }
    ));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn generator_errors_are_retried_then_exhausted() {
    let pipeline = Pipeline::new();
    let generator = ScriptedGenerator::new(vec![
        Err(GeneratorError::Timeout),
        Err(GeneratorError::Critical("model offline".to_string())),
        Err(GeneratorError::Critical("model offline".to_string())),
    ]);

    let result = pipeline
        .run("Create a function", "javascript", &generator)
        .await;

    match result {
        PipelineResult::Failure {
            reason,
            last_attempt,
        } => {
            assert!(reason.contains("generation failed"), "{reason}");
            assert!(reason.contains("model offline"), "{reason}");
            assert_eq!(last_attempt.unwrap().index, 3);
        }
        PipelineResult::Success { .. } => panic!("expected failure"),
    }
    assert_eq!(generator.call_count(), 3);
}

#[tokio::test]
async fn generator_error_then_good_output_succeeds() {
    let pipeline = Pipeline::new();
    let generator = ScriptedGenerator::new(vec![
        Err(GeneratorError::Transport),
        Ok(SUM_FUNCTION.to_string()),
    ]);

    let result = pipeline
        .run(
            "Create a function to calculate the sum of two numbers",
            "javascript",
            &generator,
        )
        .await;

    match result {
        PipelineResult::Success { attempts_used, .. } => assert_eq!(attempts_used, 2),
        PipelineResult::Failure { reason, .. } => panic!("expected success, got: {reason}"),
    }
}

#[tokio::test]
async fn empty_generator_output_consumes_an_attempt() {
    let mut pipeline = Pipeline::new();
    pipeline.set_max_attempts(1).unwrap();
    let generator = ScriptedGenerator::new(vec![Ok("   ".to_string())]);

    let result = pipeline
        .run("Create a function", "javascript", &generator)
        .await;

    match result {
        PipelineResult::Failure { reason, .. } => {
            assert!(reason.contains("empty output"), "{reason}");
        }
        PipelineResult::Success { .. } => panic!("expected failure"),
    }
}

#[tokio::test]
async fn language_parsing_is_case_insensitive() {
    let pipeline = Pipeline::new();
    let generator = ScriptedGenerator::new(vec![Ok(SUM_FUNCTION.to_string())]);

    let result = pipeline
        .run(
            "Create a function to calculate the sum of two numbers",
            "JavaScript",
            &generator,
        )
        .await;
    assert!(result.is_success());
}

#[test]
fn max_attempts_setter_rejects_zero() {
    let mut pipeline = Pipeline::new();
    assert!(pipeline.set_max_attempts(0).is_err());
    assert_eq!(pipeline.max_attempts(), 3);

    pipeline.set_max_attempts(5).unwrap();
    assert_eq!(pipeline.max_attempts(), 5);
}

#[test]
fn stats_report_registered_checkers() {
    let pipeline = Pipeline::new();
    let stats = pipeline.stats();
    assert_eq!(stats.languages, 4);
    assert_eq!(stats.checkers, 4);
    assert_eq!(stats.max_attempts, 3);
    assert_eq!(pipeline.supported_languages().len(), 4);
}

/// Checker whose internals always error, standing in for a crashed parser
/// backend.
struct CrashingChecker;

impl SyntaxChecker for CrashingChecker {
    fn id(&self) -> &str {
        "crashing"
    }

    fn validate(&self, _code: &str) -> anyhow::Result<SyntaxResult> {
        anyhow::bail!("parser backend crashed")
    }
}

#[tokio::test]
async fn checker_error_becomes_an_invalid_result() {
    let mut pipeline =
        Pipeline::new().with_checker(Language::JavaScript, Arc::new(CrashingChecker));
    pipeline.set_max_attempts(1).unwrap();
    let generator = ScriptedGenerator::new(vec![Ok(SUM_FUNCTION.to_string())]);

    let result = pipeline
        .run("Create a function", "javascript", &generator)
        .await;

    match result {
        PipelineResult::Failure {
            reason,
            last_attempt,
        } => {
            assert!(reason.contains("syntax"), "{reason}");
            let last = last_attempt.expect("exhausted run carries its last attempt");
            assert!(!last.syntax.is_valid);
            assert!(
                last.syntax
                    .errors
                    .iter()
                    .any(|e| e.contains("parser backend crashed")),
                "{:?}",
                last.syntax.errors
            );
        }
        PipelineResult::Success { .. } => panic!("expected failure"),
    }
}

#[tokio::test]
async fn syntax_failure_drops_feedback_from_an_earlier_verdict() {
    let pipeline = Pipeline::new();
    let generator = ScriptedGenerator::new(vec![
        // Parses but addresses nothing: rejected with suggestions.
        Ok("console.log('hello world');".to_string()),
        // Fails syntax, so those suggestions no longer describe the
        // latest code.
        Ok("function broken( {".to_string()),
        Ok(SUM_FUNCTION.to_string()),
    ]);

    let result = pipeline
        .run(
            "Create a function to calculate the sum of two numbers",
            "javascript",
            &generator,
        )
        .await;
    assert!(result.is_success());

    let contexts = generator.seen_contexts.lock().unwrap();
    assert!(!contexts[1].feedback.is_empty());
    assert!(contexts[2].feedback.is_empty());
}

#[tokio::test]
async fn metrics_count_one_full_run() {
    let metrics = Arc::new(InMemoryMetrics::new());
    let pipeline = Pipeline::new().with_metrics(metrics.clone());
    let generator = ScriptedGenerator::new(vec![
        Ok("function broken( {".to_string()),
        Ok(SUM_FUNCTION.to_string()),
    ]);

    let result = pipeline
        .run(
            "Create a function to calculate the sum of two numbers",
            "javascript",
            &generator,
        )
        .await;
    assert!(result.is_success());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.runs_started, 1);
    assert_eq!(snapshot.runs_succeeded, 1);
    assert_eq!(snapshot.runs_failed, 0);
    assert_eq!(snapshot.attempts_started, 2);
    assert_eq!(snapshot.syntax_fail, 1);
    assert_eq!(snapshot.syntax_pass, 1);
    assert_eq!(snapshot.reflection_pass, 1);
}
