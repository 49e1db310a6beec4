use crate::error::{LlmError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON schema a reply must conform to.
///
/// Mirrors the OpenAI `response_format.json_schema` object; providers without
/// native schema support receive the schema as an instruction instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ResponseFormat {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema,
            strict: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Instruction text for providers that only offer a plain JSON mode
    pub fn instruction(&self) -> String {
        let mut text = String::from(
            "Respond only with a single JSON object that conforms to this JSON schema, with no surrounding text.\n",
        );
        if let Some(description) = &self.description {
            text.push_str(description);
            text.push('\n');
        }
        text.push_str(&self.schema.to_string());
        text
    }
}

/// Decode a model reply into `T`.
///
/// Tolerates Markdown code fences and prose around the object, since JSON-mode
/// models do not always honour "no surrounding text".
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let trimmed = strip_code_fence(raw.trim());

    match serde_json::from_str::<T>(trimmed) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let embedded = match (trimmed.find('{'), trimmed.rfind('}')) {
                (Some(start), Some(end)) if start < end => &trimmed[start..=end],
                _ => return Err(LlmError::StructuredOutput(format!("{}: {}", first_err, raw))),
            };
            serde_json::from_str::<T>(embedded)
                .map_err(|e| LlmError::StructuredOutput(format!("{}: {}", e, raw)))
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line (```json)
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
