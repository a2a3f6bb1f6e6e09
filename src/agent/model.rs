//! Chat model seam for the agent loop.

use crate::config::AgentSettings;
use crate::error::{AssistantError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
    ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// One message of a chat transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolInvocation>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

impl ChatMessage {
    /// A plain assistant answer without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// A tool call requested by the model; `arguments` is raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// The model's reply to one request.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

/// A tool offered to the model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// A chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `messages` with `tools` available and return the model's reply.
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply>;
}

/// OpenAI chat completions.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    pub fn from_settings(settings: &AgentSettings) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if !tools.is_empty() {
            args.tools(tools.iter().map(to_openai_tool).collect::<Vec<_>>());
        }
        let request = args.build().map_err(|e| AssistantError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AssistantError::OpenAI(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AssistantError::Agent("No response from model".to_string()))?;

        let tool_calls: Vec<ToolInvocation> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        debug!("Model replied with {} tool calls", tool_calls.len());
        Ok(ModelReply {
            content: choice.message.content,
            tool_calls,
        })
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        ChatMessage::System(text) => ChatCompletionRequestSystemMessageArgs::default()
            .content(text.clone())
            .build()
            .map_err(|e| AssistantError::Agent(e.to_string()))?
            .into(),
        ChatMessage::User(text) => ChatCompletionRequestUserMessageArgs::default()
            .content(text.clone())
            .build()
            .map_err(|e| AssistantError::Agent(e.to_string()))?
            .into(),
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = content {
                args.content(content.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build()
                .map_err(|e| AssistantError::Agent(e.to_string()))?
                .into()
        }
        ChatMessage::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()
            .map_err(|e| AssistantError::Agent(e.to_string()))?
            .into(),
    };
    Ok(built)
}

fn to_openai_tool(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.clone(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters.clone()),
            strict: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_message_with_tool_calls_converts() {
        let message = ChatMessage::Assistant {
            content: None,
            tool_calls: vec![ToolInvocation {
                id: "call_1".to_string(),
                name: "list_courses".to_string(),
                arguments: r#"{"year": 2024}"#.to_string(),
            }],
        };

        match to_request_message(&message).unwrap() {
            ChatCompletionRequestMessage::Assistant(msg) => {
                let calls = msg.tool_calls.unwrap();
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].function.name, "list_courses");
            }
            other => panic!("Expected assistant message, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_spec_converts() {
        let spec = ToolSpec {
            name: "search_internal_info".to_string(),
            description: "Search".to_string(),
            parameters: serde_json::json!({"type": "object"}),
        };
        let tool = to_openai_tool(&spec);
        assert_eq!(tool.function.name, "search_internal_info");
        assert!(tool.function.parameters.is_some());
    }
}
