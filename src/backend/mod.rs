//! Development backend that answers requests by rendering prompt templates.
//!
//! It speaks the same request/reply protocol as a real text-generation
//! backend, which makes it useful for exercising the client end to end
//! without one.

pub mod prompt;
pub mod server;

pub use prompt::{PromptError, PromptLibrary};
pub use server::BackendServer;

/// Produces a completion for a rendered prompt.
pub trait Responder: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, String>;
}

/// Returns the rendered prompt unchanged.
pub struct EchoResponder;

impl Responder for EchoResponder {
    fn complete(&self, prompt: &str) -> Result<String, String> {
        Ok(prompt.to_string())
    }
}
