use crate::domain::{GenerationContext, Language};
use crate::generator::{CodeGenerator, GeneratorError, GeneratorMetadata};
use async_trait::async_trait;

/// Canned generator for tests and dry runs. Returns a small valid snippet
/// for the requested language, ignoring feedback.
pub struct MockGenerator {
    id: String,
}

impl MockGenerator {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl CodeGenerator for MockGenerator {
    fn metadata(&self) -> GeneratorMetadata {
        GeneratorMetadata {
            id: self.id.clone(),
            name: "MockGenerator".to_string(),
            model: Some("mock".to_string()),
        }
    }

    async fn generate(&self, ctx: &GenerationContext) -> Result<String, GeneratorError> {
        let code = match ctx.language {
            Language::Html => {
                "<!DOCTYPE html>\n<html>\n<body>\n<form><input type=\"text\"><button>Submit</button></form>\n</body>\n</html>"
            }
            Language::Css => ".container {\n  display: flex;\n  justify-content: center;\n}",
            Language::JavaScript => {
                "function sum(a, b) {\n  return a + b;\n}\nconsole.log(sum(1, 2));"
            }
            Language::Solidity => {
                "pragma solidity ^0.8.0;\n\ncontract Counter {\n  uint256 public count;\n  function increment() public { count += 1; }\n}"
            }
        };
        Ok(code.to_string())
    }
}
