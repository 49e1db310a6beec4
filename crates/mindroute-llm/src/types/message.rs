use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat message, tagged by role on the wire: `{"role":"user","content":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System prompt (instructions)
    System {
        content: String,
    },

    /// User/Human message
    #[serde(rename = "user")]
    Human {
        content: String,
    },

    /// Assistant/AI message
    #[serde(rename = "assistant")]
    AI {
        content: String,
    },
}

impl Message {
    /// Create system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create human message
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// Create AI message
    pub fn ai(content: impl Into<String>) -> Self {
        Self::AI {
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::Human { .. } => Role::User,
            Self::AI { .. } => Role::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content } | Self::Human { content } | Self::AI { content } => content,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::Human { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
