use std::sync::Arc;

use crate::core::config::ChatConfig;
use crate::core::ApiError;
use crate::history::{ConversationHistory, HistoryMessage};
use crate::llm::{ChatMessage, ChatProvider, ChatRequest};
use crate::rag::{SearchHit, VectorStore};

/// Answers queries by retrieving context, assembling the prompt, and calling
/// the chat provider.
///
/// The chat call is hard-failing: on error the conversation history is left
/// untouched.
pub struct ChatEngine {
    store: Arc<VectorStore>,
    provider: Arc<dyn ChatProvider>,
    history: ConversationHistory,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl ChatEngine {
    pub fn new(
        store: Arc<VectorStore>,
        provider: Arc<dyn ChatProvider>,
        history: ConversationHistory,
        config: &ChatConfig,
    ) -> Self {
        Self {
            store,
            provider,
            history,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub async fn answer_query(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        top_k: usize,
    ) -> Result<String, ApiError> {
        let contexts = self.store.search(query, top_k).await?;
        let history = conversation_id
            .map(|id| self.history.get(id))
            .unwrap_or_default();
        let prompt = build_prompt(query, &contexts, &history);

        let mut request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        request.temperature = Some(self.temperature);
        request.max_tokens = Some(self.max_tokens);

        let answer = self.provider.chat(request, &self.model).await?;

        if let Some(id) = conversation_id {
            self.history.record_exchange(id, query, &answer);
        }

        Ok(answer)
    }
}

/// Prompt template: system line, retrieved context blocks keyed by chunk id,
/// then the conversation transcript ending in the open assistant turn.
fn build_prompt(query: &str, contexts: &[SearchHit], history: &[HistoryMessage]) -> String {
    let system = "You are EventEase, an assistant answering user questions about an event. \
                  Answer concisely and cite any relevant context chunk id when helpful.";

    let context_block = contexts
        .iter()
        .map(|hit| format!("CHUNK_ID:{}\n{}", hit.id, hit.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut parts = vec![
        system.to_string(),
        format!("Context:\n{context_block}"),
        "Conversation:".to_string(),
    ];
    for message in history {
        parts.push(format!("{}: {}", message.role.to_uppercase(), message.content));
    }
    parts.push(format!("USER: {query}"));
    parts.push("ASSISTANT:".to_string());

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use crate::core::config::AppConfig;
    use crate::embeddings::{EmbedError, EmbeddingChain, EmbeddingProvider};
    use crate::rag::DocumentInput;

    use super::*;

    struct StubChat {
        fail: bool,
    }

    #[async_trait]
    impl ChatProvider for StubChat {
        fn name(&self) -> &str {
            "stub"
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            if self.fail {
                Err(ApiError::Upstream(
                    "chat completion returned 500 Internal Server Error".to_string(),
                ))
            } else {
                Ok("stub answer".to_string())
            }
        }
    }

    struct UnitProvider;

    #[async_trait]
    impl EmbeddingProvider for UnitProvider {
        fn name(&self) -> &'static str {
            "unit-stub"
        }

        async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(batch.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    fn engine_pair(fail_chat: bool, dir: &tempfile::TempDir) -> (ChatEngine, Arc<VectorStore>) {
        let chain = Arc::new(EmbeddingChain::new(vec![Arc::new(UnitProvider)], 32));
        let store = Arc::new(VectorStore::open(dir.path().join("vs_index.json"), chain));
        let engine = ChatEngine::new(
            store.clone(),
            Arc::new(StubChat { fail: fail_chat }),
            ConversationHistory::new(30),
            &AppConfig::default().chat,
        );
        (engine, store)
    }

    #[test]
    fn prompt_contains_context_history_and_open_turn() {
        let contexts = vec![SearchHit {
            id: "notes.txt_2".to_string(),
            text: "Doors open at 9am.".to_string(),
            metadata: json!({}),
            score: 0.9,
        }];
        let history = vec![
            HistoryMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
                created_at: String::new(),
            },
            HistoryMessage {
                role: "assistant".to_string(),
                content: "hello".to_string(),
                created_at: String::new(),
            },
        ];

        let prompt = build_prompt("when do doors open?", &contexts, &history);

        assert!(prompt.contains("CHUNK_ID:notes.txt_2"));
        assert!(prompt.contains("Doors open at 9am."));
        assert!(prompt.contains("USER: hi"));
        assert!(prompt.contains("ASSISTANT: hello"));
        assert!(prompt.contains("USER: when do doors open?"));
        assert!(prompt.ends_with("ASSISTANT:"));
    }

    #[tokio::test]
    async fn successful_answer_updates_history() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, store) = engine_pair(false, &dir);
        store
            .add_documents(
                vec![DocumentInput {
                    id: "d_0".to_string(),
                    text: "the agenda".to_string(),
                    metadata: json!({}),
                }],
                false,
            )
            .await
            .unwrap();

        let answer = engine
            .answer_query("what is the agenda?", Some("c1"), 4)
            .await
            .unwrap();

        assert_eq!(answer, "stub answer");
        let messages = engine.history().get("c1");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "what is the agenda?");
        assert_eq!(messages[1].content, "stub answer");
    }

    #[tokio::test]
    async fn failed_chat_call_leaves_history_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, _store) = engine_pair(true, &dir);

        let err = engine
            .answer_query("anything", Some("c1"), 4)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Upstream(_)));
        assert!(engine.history().get("c1").is_empty());
        assert_eq!(engine.history().conversation_count(), 0);
    }
}
