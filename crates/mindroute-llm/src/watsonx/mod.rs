mod auth;
mod client;

pub use auth::IamTokenProvider;
pub use client::{
    WatsonxClient, WatsonxClientBuilder, DEFAULT_API_VERSION, DEFAULT_IAM_URL, DEFAULT_MODEL_ID,
    DEFAULT_WATSONX_URL,
};
