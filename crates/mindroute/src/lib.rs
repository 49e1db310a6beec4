pub mod config;
pub mod logging;
pub mod session;

pub use config::Config;
pub use session::Session;
