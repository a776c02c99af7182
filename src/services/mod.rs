// src/services/mod.rs
//
// Clients for services outside this process

pub mod generation;

pub use generation::{
    ChatCompletionClient, GenerationConfig, GenerationError, TextGenerator,
};
