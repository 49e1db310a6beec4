use crate::error::GraphError;
use mindroute_llm::ResponseFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category the classifier assigns to a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Needs emotional support; handled by the therapist
    Emotional,
    /// Needs facts or practical answers; handled by the logical assistant
    Logical,
}

impl MessageType {
    pub const ALL: [MessageType; 2] = [MessageType::Emotional, MessageType::Logical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emotional => "emotional",
            Self::Logical => "logical",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emotional" => Ok(Self::Emotional),
            "logical" => Ok(Self::Logical),
            other => Err(GraphError::Classification(format!(
                "unknown message type '{}'",
                other
            ))),
        }
    }
}

/// Structured output requested from the model by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub message_type: MessageType,
}

impl Classification {
    pub const SCHEMA_NAME: &'static str = "message_classifier";

    /// JSON schema constraining `message_type` to the two categories
    pub fn response_format() -> ResponseFormat {
        let categories: Vec<&str> = MessageType::ALL.iter().map(|t| t.as_str()).collect();

        ResponseFormat::new(
            Self::SCHEMA_NAME,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "message_type": {
                        "type": "string",
                        "enum": categories,
                        "description": "Classify if the message requires an emotional (therapist) or logical response."
                    }
                },
                "required": ["message_type"],
                "additionalProperties": false
            }),
        )
        .with_description("Classification of the latest user message.")
        .strict(true)
    }
}
