use crate::config::ProviderConfig;
use crate::cons::provider_cons::LLMProvider;
use crate::llm::error::ClipError;
use crate::llm::models::provider_handle::{
    create_client, probe_error_message, stream_chat, test_connection, AnyProviderClient, ChatRequest,
};
use serde_json::Value;
use tokio_stream::StreamExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: LLMProvider, base_url: &str) -> ProviderConfig {
        ProviderConfig {
            provider,
            api_key: "k".to_string(),
            base_url: base_url.to_string(),
            model: "m".to_string(),
        }
    }

    fn openai_sse(fragments: &[&str]) -> String {
        let mut body = String::new();
        for fragment in fragments {
            let payload = serde_json::json!({ "choices": [{ "delta": { "content": fragment } }] });
            body.push_str(&format!("data: {}\n\n", payload));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    #[test]
    fn create_client_maps_provider_to_wire_shape() {
        let base = "https://example.com/v1";
        assert!(matches!(
            create_client(&config(LLMProvider::OpenAI, base), 0.7),
            AnyProviderClient::OpenAI(_)
        ));
        assert!(matches!(
            create_client(&config(LLMProvider::DeepSeek, base), 0.7),
            AnyProviderClient::OpenAI(_)
        ));
        assert!(matches!(
            create_client(&config(LLMProvider::Claude, base), 0.7),
            AnyProviderClient::Claude(_)
        ));
        assert!(matches!(
            create_client(&config(LLMProvider::Gemini, base), 0.7),
            AnyProviderClient::Gemini(_)
        ));
        assert!(matches!(
            create_client(&config(LLMProvider::Custom, base), 0.7),
            AnyProviderClient::Custom(_)
        ));
    }

    #[tokio::test]
    async fn stream_chat_yields_fragments_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer k"))
            .respond_with(ResponseTemplate::new(200).set_body_string(openai_sse(&["He", "llo", "!"])))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config(LLMProvider::OpenAI, &server.uri());
        let mut stream = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page"))
            .await
            .expect("stream opens");

        let mut fragments = Vec::new();
        while let Some(item) = stream.next().await {
            fragments.push(item.expect("fragment"));
        }
        assert_eq!(fragments, vec!["He", "llo", "!"]);
        assert_eq!(stream.stats().dropped(), 0);
    }

    #[tokio::test]
    async fn stream_chat_skips_malformed_line_and_counts_it() {
        let server = MockServer::start().await;
        let body = format!(
            "{}data: {{broken\n\n{}",
            openai_sse(&["a"]).replace("data: [DONE]\n\n", ""),
            openai_sse(&["b"])
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let cfg = config(LLMProvider::OpenAI, &server.uri());
        let mut stream = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page"))
            .await
            .expect("stream opens");
        let mut fragments = Vec::new();
        while let Some(item) = stream.next().await {
            fragments.push(item.expect("fragment"));
        }
        assert_eq!(fragments, vec!["a", "b"]);
        assert_eq!(stream.stats().dropped(), 1);
    }

    #[tokio::test]
    async fn stream_chat_with_no_deltas_ends_cleanly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(openai_sse(&[])))
            .mount(&server)
            .await;

        let cfg = config(LLMProvider::OpenAI, &server.uri());
        let mut stream = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page"))
            .await
            .expect("stream opens");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn anthropic_stream_with_no_deltas_ends_cleanly() {
        let server = MockServer::start().await;
        let body = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config(LLMProvider::Claude, &server.uri());
        let stream = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page"))
            .await
            .expect("stream opens");
        let stats = stream.stats();
        let fragments: Vec<String> = stream.map(|f| f.expect("no error")).collect().await;
        assert!(fragments.is_empty());
        assert_eq!(stats.dropped(), 0);
    }

    #[tokio::test]
    async fn gemini_stream_with_only_finish_event_ends_cleanly() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[],\"role\":\"model\"},\"finishReason\":\"STOP\"}]}\n\n",
            "data: {\"usageMetadata\":{\"promptTokenCount\":3}}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/models/m:streamGenerateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config(LLMProvider::Gemini, &server.uri());
        let stream = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page"))
            .await
            .expect("stream opens");
        let stats = stream.stats();
        let fragments: Vec<String> = stream.map(|f| f.expect("no error")).collect().await;
        assert!(fragments.is_empty());
        assert_eq!(stats.dropped(), 0);
    }

    #[tokio::test]
    async fn stream_chat_returns_transport_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":{\"message\":\"bad key\"}}"))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config(LLMProvider::OpenAI, &server.uri());
        let result = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page")).await;
        match result {
            Err(ClipError::Transport { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            Err(other) => panic!("expected transport error, got {}", other),
            Ok(_) => panic!("expected transport error, got a stream"),
        }
    }

    #[tokio::test]
    async fn stream_chat_rejects_empty_key_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cfg = config(LLMProvider::OpenAI, &server.uri());
        cfg.api_key = "  ".to_string();
        let result = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page")).await;
        assert!(matches!(result, Err(ClipError::Config(_))));
    }

    #[tokio::test]
    async fn claude_request_carries_key_header_and_no_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("x-api-key", "k"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_string(openai_sse(&["ok"])))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config(LLMProvider::Claude, &server.uri());
        let stream = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page"))
            .await
            .expect("stream opens");
        let fragments: Vec<String> = stream.map(|f| f.expect("fragment")).collect().await;
        assert_eq!(fragments, vec!["ok"]);

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn gemini_request_targets_model_path_with_key_query() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]},\"finishReason\":\"STOP\"}]}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/models/m:streamGenerateContent"))
            .and(query_param("key", "k"))
            .and(query_param("alt", "sse"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config(LLMProvider::Gemini, &server.uri());
        let stream = stream_chat(&cfg, 0.7, &ChatRequest::new("sys", "page"))
            .await
            .expect("stream opens");
        let fragments: Vec<String> = stream.map(|f| f.expect("fragment")).collect().await;
        assert_eq!(fragments, vec!["Hel", "lo"]);

        let requests = server.received_requests().await.expect("recording enabled");
        let sent: Value = serde_json::from_slice(&requests[0].body).expect("json body");
        assert_eq!(sent["contents"][0]["parts"][0]["text"], "sys\n\npage");
    }

    #[tokio::test]
    async fn test_connection_with_empty_key_fails_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cfg = config(LLMProvider::OpenAI, &server.uri());
        cfg.api_key = String::new();
        let result = test_connection(&cfg).await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_connection_succeeds_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"choices\":[]}"))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_connection(&config(LLMProvider::DeepSeek, &server.uri())).await;
        assert!(result.success);
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_connection_reports_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("{\"error\":{\"message\":\"Invalid API key\"}}"),
            )
            .mount(&server)
            .await;

        let result = test_connection(&config(LLMProvider::OpenAI, &server.uri())).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid API key"));
    }

    #[tokio::test]
    async fn test_connection_gemini_uses_generate_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/m:generateContent"))
            .and(query_param("key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_connection(&config(LLMProvider::Gemini, &server.uri())).await;
        assert!(result.success);
    }

    #[test]
    fn probe_error_message_prefers_nested_then_top_level_message() {
        assert_eq!(probe_error_message(400, "{\"error\":{\"message\":\"nested\"}}"), "nested");
        assert_eq!(probe_error_message(400, "{\"message\":\"top\"}"), "top");
        assert_eq!(probe_error_message(503, "{\"detail\":\"x\"}"), "HTTP 503");
    }

    #[test]
    fn probe_error_message_truncates_non_json_body() {
        let body = "x".repeat(250);
        assert_eq!(probe_error_message(500, &body).chars().count(), 100);
        assert_eq!(probe_error_message(502, "Bad Gateway"), "Bad Gateway");
    }
}
