//! Provider clients implementing the Model capability

pub mod openai;
pub mod scripted;

pub use openai::OpenAiCompatibleModel;
pub use scripted::{ScriptedModel, ScriptedReply};
