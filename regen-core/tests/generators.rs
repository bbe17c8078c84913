use httpmock::prelude::*;
use regen_core::checkers::default_checkers;
use regen_core::domain::{GenerationContext, Language};
use regen_core::generator::{CodeGenerator, GeneratorError};
use regen_core::generators::{
    create_generator, GeneratorConfig, MockGenerator, OllamaGenerator, ScriptConfig,
    ScriptGenerator,
};
use regen_core::logging::NoopEventLogger;
use std::sync::Arc;

fn ctx(language: Language) -> GenerationContext {
    GenerationContext {
        problem_statement: "Create a function".to_string(),
        language,
        attempt: 1,
        previous_attempts: vec![],
        feedback: vec![],
    }
}

#[tokio::test]
async fn mock_generator_output_passes_its_own_checker() {
    let generator = MockGenerator::new("mock");
    let checkers = default_checkers();

    for language in Language::all() {
        let code = generator.generate(&ctx(language)).await.unwrap();
        let result = checkers[&language].validate(&code).unwrap();
        assert!(
            result.is_valid,
            "mock {language} output failed syntax: {:?}",
            result.errors
        );
    }
}

#[tokio::test]
async fn script_generator_returns_raw_stdout() {
    let generator = ScriptGenerator::new(
        "script",
        ScriptConfig {
            command: "echo".to_string(),
            args: vec!["function f() {}".to_string()],
            timeout_ms: Some(5_000),
        },
    );
    let code = generator.generate(&ctx(Language::JavaScript)).await.unwrap();
    assert_eq!(code.trim(), "function f() {}");
}

#[tokio::test]
async fn script_generator_unwraps_json_envelope() {
    let generator = ScriptGenerator::new(
        "script",
        ScriptConfig {
            command: "echo".to_string(),
            args: vec!["{\"code\": \"const x = 1;\"}".to_string()],
            timeout_ms: Some(5_000),
        },
    );
    let code = generator.generate(&ctx(Language::JavaScript)).await.unwrap();
    assert_eq!(code, "const x = 1;");
}

#[tokio::test]
async fn script_generator_reports_nonzero_exit_as_critical() {
    let generator = ScriptGenerator::new(
        "script",
        ScriptConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "echo boom >&2; exit 1".to_string()],
            timeout_ms: Some(5_000),
        },
    );
    let err = generator
        .generate(&ctx(Language::JavaScript))
        .await
        .unwrap_err();
    match err {
        GeneratorError::Critical(msg) => assert!(msg.contains("boom"), "{msg}"),
        other => panic!("expected critical error, got {other:?}"),
    }
}

#[tokio::test]
async fn script_generator_missing_command_is_unavailable() {
    let generator = ScriptGenerator::new(
        "script",
        ScriptConfig {
            command: "definitely-not-a-real-binary".to_string(),
            args: vec![],
            timeout_ms: Some(1_000),
        },
    );
    let err = generator
        .generate(&ctx(Language::JavaScript))
        .await
        .unwrap_err();
    assert!(matches!(err, GeneratorError::Unavailable));
}

#[tokio::test]
async fn ollama_generator_returns_response_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(200).json_body(serde_json::json!({
            "response": "function sum(a, b) { return a + b; }",
            "done": true
        }));
    });

    let generator = OllamaGenerator::with_client(
        "ollama",
        server.base_url(),
        "codellama".to_string(),
        reqwest::Client::new(),
        Arc::new(NoopEventLogger),
    );
    let code = generator.generate(&ctx(Language::JavaScript)).await.unwrap();
    assert_eq!(code, "function sum(a, b) { return a + b; }");
}

#[tokio::test]
async fn ollama_generator_strips_markdown_fences() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(200).json_body(serde_json::json!({
            "response": "```javascript\nconst x = 1;\n```",
            "done": true
        }));
    });

    let generator = OllamaGenerator::with_client(
        "ollama",
        server.base_url(),
        "codellama".to_string(),
        reqwest::Client::new(),
        Arc::new(NoopEventLogger),
    );
    let code = generator.generate(&ctx(Language::JavaScript)).await.unwrap();
    assert_eq!(code, "const x = 1;");
}

#[tokio::test]
async fn ollama_generator_surfaces_server_error_as_critical() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(500).body("model not loaded");
    });

    let generator = OllamaGenerator::with_client(
        "ollama",
        server.base_url(),
        "codellama".to_string(),
        reqwest::Client::new(),
        Arc::new(NoopEventLogger),
    );
    let err = generator
        .generate(&ctx(Language::JavaScript))
        .await
        .unwrap_err();
    match err {
        GeneratorError::Critical(msg) => assert!(msg.contains("model not loaded"), "{msg}"),
        other => panic!("expected critical error, got {other:?}"),
    }
}

#[tokio::test]
async fn factory_builds_each_generator_kind() {
    let logger = Arc::new(NoopEventLogger);

    let mock = create_generator(
        GeneratorConfig::Mock {
            id: "m".to_string(),
        },
        logger.clone(),
    );
    assert_eq!(mock.metadata().name, "MockGenerator");

    let script = create_generator(
        GeneratorConfig::Script {
            id: "s".to_string(),
            command: "echo".to_string(),
            args: vec![],
            timeout_ms: None,
        },
        logger.clone(),
    );
    assert_eq!(script.metadata().name, "ScriptGenerator");

    let ollama = create_generator(
        GeneratorConfig::Ollama {
            id: "o".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "codellama".to_string(),
        },
        logger,
    );
    assert_eq!(ollama.metadata().model.as_deref(), Some("codellama"));
}
