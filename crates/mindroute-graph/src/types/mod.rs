pub mod state;
pub mod config;
pub mod classification;

pub use state::{ConversationState, StateUpdate};
pub use config::LLMConfig;
pub use classification::{Classification, MessageType};
