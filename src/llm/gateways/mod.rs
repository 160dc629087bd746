pub mod groq;
pub mod messages_adapter;

pub use groq::{GroqConfig, GroqGateway, DEFAULT_GROQ_BASE_URL};
