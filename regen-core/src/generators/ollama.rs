use crate::domain::GenerationContext;
use crate::generator::{CodeGenerator, GeneratorError, GeneratorMetadata};
use crate::logging::{LogEvent, LogLevel, SharedEventLogger};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Generator backed by a local Ollama server (`/api/generate`,
/// non-streaming). Previous attempts and feedback are folded into the
/// prompt so the model can see what was rejected and why.
pub struct OllamaGenerator {
    id: String,
    client: Client,
    base_url: String,
    model: String,
    logger: SharedEventLogger,
}

#[derive(serde::Deserialize)]
struct OllamaResponse {
    response: Option<String>,
    error: Option<String>,
}

impl OllamaGenerator {
    pub fn new(
        id: impl Into<String>,
        base_url: String,
        model: String,
        logger: SharedEventLogger,
    ) -> Self {
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            id: id.into(),
            client,
            base_url,
            model,
            logger,
        }
    }

    pub fn with_client(
        id: impl Into<String>,
        base_url: String,
        model: String,
        client: Client,
        logger: SharedEventLogger,
    ) -> Self {
        Self {
            id: id.into(),
            client,
            base_url,
            model,
            logger,
        }
    }

    fn build_prompt(ctx: &GenerationContext) -> String {
        let mut prompt = format!(
            "Write {} code solving the following problem. Respond with code only, no explanation.\n\nProblem: {}\n",
            ctx.language, ctx.problem_statement
        );
        if !ctx.previous_attempts.is_empty() {
            prompt.push_str(&format!(
                "\nThis is attempt {}. {} earlier attempt(s) were rejected.\n",
                ctx.attempt,
                ctx.previous_attempts.len()
            ));
            if let Some(last) = ctx.previous_attempts.last() {
                if !last.syntax.errors.is_empty() {
                    prompt.push_str(&format!(
                        "Last attempt had syntax errors: {}\n",
                        last.syntax.errors.join("; ")
                    ));
                }
            }
        }
        if !ctx.feedback.is_empty() {
            prompt.push_str(&format!("Feedback: {}\n", ctx.feedback.join("; ")));
        }
        prompt
    }
}

#[async_trait]
impl CodeGenerator for OllamaGenerator {
    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata {
            id: self.id.clone(),
            name: "OllamaGenerator".to_string(),
            model: Some(self.model.clone()),
        }
    }

    async fn generate(&self, ctx: &GenerationContext) -> Result<String, GeneratorError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let payload = serde_json::json!({
            "model": self.model,
            "prompt": Self::build_prompt(ctx),
            "stream": false,
        });

        self.logger.log(
            LogEvent::new(LogLevel::Debug, "ollama.request.send")
                .with_attempt(ctx.attempt)
                .with_field("model", self.model.clone()),
        );

        let resp = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout
                } else {
                    GeneratorError::Transport
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::Critical(format!(
                "Ollama error {status}: {body}"
            )));
        }

        let body: OllamaResponse = resp
            .json()
            .await
            .map_err(|_| GeneratorError::InvalidResponse)?;

        if let Some(err) = body.error {
            return Err(GeneratorError::Critical(err));
        }

        let content = body.response.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(GeneratorError::InvalidResponse);
        }

        self.logger.log(
            LogEvent::new(LogLevel::Debug, "ollama.generation.complete")
                .with_attempt(ctx.attempt)
                .with_field("content_length", content.len().to_string()),
        );
        Ok(strip_code_fences(&content))
    }
}

/// Models often wrap code in markdown fences; strip the outermost pair.
fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest,
        };
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim_end().to_string();
        }
    }
    trimmed.to_string()
}
