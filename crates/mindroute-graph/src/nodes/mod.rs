pub mod classifier;
pub mod responder;
pub mod chatbot;

pub use classifier::ClassifierNode;
pub use responder::{Persona, ResponderNode};
pub use chatbot::ChatbotNode;
