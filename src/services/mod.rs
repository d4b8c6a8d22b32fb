pub mod chat_client;
pub mod normalizer;
pub mod prompt;
