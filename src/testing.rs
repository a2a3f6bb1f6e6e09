//! In-process fakes shared by unit tests.

use crate::agent::{ChatMessage, ChatModel, ModelReply, ToolInvocation, ToolSpec};
use crate::convert::PageFetcher;
use crate::embedding::Embedder;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Serves fixed pages and counts fetches; unknown URLs answer 404.
pub struct CountingFetcher {
    pages: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl CountingFetcher {
    pub fn with_pages(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url).cloned().ok_or_else(|| AssistantError::HttpStatus {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Fails every fetch.
pub struct UnreachableFetcher;

#[async_trait]
impl PageFetcher for UnreachableFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        Err(AssistantError::Fetch {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

const KEYWORD_DIMS: usize = 64;

/// Bag-of-words embedder: each lowercase word hashes into one of 64 buckets.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; KEYWORD_DIMS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
        {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize))
                % KEYWORD_DIMS;
            v[bucket] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        KEYWORD_DIMS
    }

    fn model(&self) -> &str {
        "keyword-test"
    }
}

/// Embedder whose every call fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(AssistantError::Embedding("service unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AssistantError::Embedding("service unavailable".to_string()))
    }

    fn dimensions(&self) -> usize {
        KEYWORD_DIMS
    }

    fn model(&self) -> &str {
        "keyword-test"
    }
}

/// Chat model that replays queued replies and records every request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<ModelReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(text: &str) -> Result<ModelReply> {
        Ok(ModelReply {
            content: Some(text.to_string()),
            tool_calls: Vec::new(),
        })
    }

    pub fn call(id: &str, name: &str, arguments: &str) -> Result<ModelReply> {
        Ok(ModelReply {
            content: None,
            tool_calls: vec![ToolInvocation {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        })
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage], _tools: &[ToolSpec]) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AssistantError::OpenAI("script exhausted".to_string())))
    }
}
