mod mock;
mod ollama;
mod script;

pub use mock::MockGenerator;
pub use ollama::OllamaGenerator;
pub use script::{ScriptConfig, ScriptGenerator};

use crate::generator::CodeGenerator;
use crate::logging::SharedEventLogger;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneratorConfig {
    Mock {
        id: String,
    },
    Script {
        id: String,
        command: String,
        args: Vec<String>,
        timeout_ms: Option<u64>,
    },
    Ollama {
        id: String,
        base_url: String,
        model: String,
    },
}

impl GeneratorConfig {
    pub fn id(&self) -> &str {
        match self {
            Self::Mock { id } => id,
            Self::Script { id, .. } => id,
            Self::Ollama { id, .. } => id,
        }
    }
}

pub fn create_generator(config: GeneratorConfig, logger: SharedEventLogger) -> Box<dyn CodeGenerator> {
    match config {
        GeneratorConfig::Mock { id } => Box::new(MockGenerator::new(id)),
        GeneratorConfig::Script {
            id,
            command,
            args,
            timeout_ms,
        } => Box::new(ScriptGenerator::new(
            id,
            ScriptConfig {
                command,
                args,
                timeout_ms,
            },
        )),
        GeneratorConfig::Ollama {
            id,
            base_url,
            model,
        } => Box::new(OllamaGenerator::new(id, base_url, model, logger)),
    }
}
