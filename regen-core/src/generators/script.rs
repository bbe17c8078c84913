use crate::domain::GenerationContext;
use crate::generator::{CodeGenerator, GeneratorError, GeneratorMetadata};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_ms: Option<u64>,
}

/// Generator backed by an external command: the generation context is
/// written to stdin as JSON, generated code is read from stdout (either a
/// JSON envelope with a "code" field or raw text).
pub struct ScriptGenerator {
    id: String,
    config: ScriptConfig,
}

#[derive(Debug, Deserialize)]
struct ScriptOutput {
    code: String,
}

impl ScriptGenerator {
    pub fn new(id: impl Into<String>, config: ScriptConfig) -> Self {
        Self {
            id: id.into(),
            config,
        }
    }
}

#[async_trait]
impl CodeGenerator for ScriptGenerator {
    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata {
            id: self.id.clone(),
            name: "ScriptGenerator".to_string(),
            model: None,
        }
    }

    async fn generate(&self, ctx: &GenerationContext) -> Result<String, GeneratorError> {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|_| GeneratorError::Unavailable)?;

        let stdin = child.stdin.as_mut().ok_or(GeneratorError::Transport)?;
        let input_json = serde_json::to_string(ctx).map_err(|_| GeneratorError::Transport)?;
        // A script may exit without reading stdin; a broken pipe here is fine.
        let _ = stdin.write_all(input_json.as_bytes()).await;
        drop(child.stdin.take());

        let wait = child.wait_with_output();
        let output = match self.config.timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), wait)
                .await
                .map_err(|_| GeneratorError::Timeout)?,
            None => wait.await,
        }
        .map_err(|_| GeneratorError::Transport)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GeneratorError::Critical(format!(
                "generator script exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|_| GeneratorError::InvalidResponse)?;

        // JSON envelope first, raw text as fallback.
        let code = match serde_json::from_str::<ScriptOutput>(&stdout) {
            Ok(parsed) => parsed.code,
            Err(_) => stdout,
        };

        if code.trim().is_empty() {
            return Err(GeneratorError::InvalidResponse);
        }
        Ok(code)
    }
}
