use crate::llm::models::openai::{extract_chat_completions_delta, OpenAiClient};
use crate::llm::models::provider_base::{ChatRequest, ProviderClient};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(
            "https://api.openai.com/v1/".to_string(),
            "sk-test".to_string(),
            "gpt-4o-mini".to_string(),
        )
    }

    #[test]
    fn stream_request_targets_chat_completions_with_bearer_auth() {
        let wire = client().stream_request(&ChatRequest::new("sys", "page"));
        assert_eq!(wire.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(wire.header("authorization"), Some("Bearer sk-test"));
        assert_eq!(wire.header("content-type"), Some("application/json"));
    }

    #[test]
    fn stream_request_body_carries_system_and_user_messages() {
        let wire = client()
            .with_temperature(0.2)
            .stream_request(&ChatRequest::new("sys", "page"));
        assert_eq!(wire.body["model"], "gpt-4o-mini");
        assert_eq!(wire.body["stream"], true);
        assert_eq!(wire.body["messages"][0], json!({ "role": "system", "content": "sys" }));
        assert_eq!(wire.body["messages"][1], json!({ "role": "user", "content": "page" }));
        let temperature = wire.body["temperature"].as_f64().expect("temperature");
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn probe_request_is_minimal_and_not_streaming() {
        let wire = client().probe_request();
        assert_eq!(wire.body["max_tokens"], 10);
        assert_eq!(wire.body["messages"][0]["content"], "Hi");
        assert!(wire.body.get("stream").is_none());
    }

    #[test]
    fn extract_delta_reads_first_choice_content() {
        let payload = json!({ "choices": [{ "delta": { "content": "Hi" } }] });
        assert_eq!(extract_chat_completions_delta(&payload).as_deref(), Some("Hi"));
    }

    #[test]
    fn extract_delta_ignores_empty_and_missing_content() {
        assert_eq!(
            extract_chat_completions_delta(&json!({ "choices": [{ "delta": { "content": "" } }] })),
            None
        );
        assert_eq!(extract_chat_completions_delta(&json!({ "choices": [] })), None);
        assert_eq!(extract_chat_completions_delta(&json!({ "usage": {} })), None);
    }
}
