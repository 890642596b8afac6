// Resume generation: prompt composition, the generation pipeline, batch runs,
// and the HTTP handlers in front of them.
// All completion calls go through llm_client; all browser use goes through render.

pub mod batch;
pub mod composer;
pub mod handlers;
pub mod naming;
pub mod pipeline;
pub mod prompts;
