use super::direct::extract_direct_prompt;
use crate::{client::ChatClient, models::ChatMessage};

pub const SMART_PROMPT_INSTRUCTION: &str = "You turn chat messages into prompts for an image generator. \
Read the message and describe the single most visual scene in it as concise, comma-separated tags \
(subject, appearance, clothing, pose, setting, lighting, mood, art style). \
Use at most 200 words. Reply with the tags only, no explanations and no quotes.";

/// Summarise `text` into an image prompt with the chat model.
///
/// Falls back to the cleaned message text on any failure.
pub async fn extract_smart_prompt(text: &str, chat: &ChatClient) -> String {
    let cleaned = extract_direct_prompt(text);
    if cleaned.is_empty() {
        return cleaned;
    }

    let messages = vec![
        ChatMessage::system(SMART_PROMPT_INSTRUCTION),
        ChatMessage::user(cleaned.clone()),
    ];

    match chat.complete(messages).await {
        Ok(summary) if !summary.is_empty() => {
            log::info!("Smart prompt derived ({} chars)", summary.chars().count());
            summary
        }
        Ok(_) => {
            log::warn!("Smart prompt came back empty, using message text");
            cleaned
        }
        Err(e) => {
            log::warn!("Smart prompt failed, using message text: {}", e);
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_for(server: &MockServer) -> ChatClient {
        ChatClient::new(
            GeneratorConfig::default()
                .with_api(format!("{}/v1", server.uri()), "sk")
                .with_model("image-model")
                .with_summary_model("text-model"),
        )
    }

    #[tokio::test]
    async fn test_summary_used_when_available() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "text-model",
                "messages": [
                    {"role": "system", "content": SMART_PROMPT_INSTRUCTION},
                    {"role": "user", "content": "She walks into the rainy neon street."}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "  1girl, rain, neon street, night  "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let prompt =
            extract_smart_prompt("<p>She walks into the rainy neon street.</p>", &chat_for(&server)).await;
        assert_eq!(prompt, "1girl, rain, neon street, night");
    }

    #[tokio::test]
    async fn test_falls_back_on_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let prompt = extract_smart_prompt("A  quiet\nlake", &chat_for(&server)).await;
        assert_eq!(prompt, "A quiet lake");
    }

    #[tokio::test]
    async fn test_falls_back_on_empty_summary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "   "}}]
            })))
            .mount(&server)
            .await;

        let prompt = extract_smart_prompt("A quiet lake", &chat_for(&server)).await;
        assert_eq!(prompt, "A quiet lake");
    }

    #[tokio::test]
    async fn test_empty_message_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let prompt = extract_smart_prompt("<br/>", &chat_for(&server)).await;
        assert_eq!(prompt, "");
    }
}
