// Course generation engine: outline synthesis, per-module content, prompts.
// All LLM calls go through llm_client; no direct Groq API calls here.

pub mod content;
pub mod generator;
pub mod outline;
pub mod prompts;
