//! Tool-calling agent over the MPCS tools.
//!
//! The agent sends the conversation to a chat model, runs whatever tools the
//! model asks for, and repeats until the model gives a final answer.

mod memory;
mod model;
mod runner;

pub use memory::{estimate_tokens, ConversationMemory, Turn};
pub use model::{ChatMessage, ChatModel, ModelReply, OpenAIChatModel, ToolInvocation, ToolSpec};
pub use runner::{Agent, AgentResponse, AskFailure, ToolCallRecord};
