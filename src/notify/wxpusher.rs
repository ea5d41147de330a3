//! WXPusher push channel.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::notify::Notifier;

pub const ENV_APP_TOKEN: &str = "WXPUSHER_APP_TOKEN";
pub const ENV_UIDS: &str = "WXPUSHER_UIDS";
pub const ENV_TOPIC_IDS: &str = "WXPUSHER_TOPIC_IDS";

const API_URL: &str = "https://wxpusher.zjiecode.com/api/send/message";

/// Markdown content type.
const CONTENT_TYPE_MARKDOWN: u8 = 3;

/// Success code returned by the API.
const CODE_OK: i64 = 1000;

/// WXPusher channel: JSON POST addressed to uids and/or topics.
pub struct WxPusher {
    client: Client,
    app_token: String,
    uids: Vec<String>,
    topic_ids: Vec<String>,
    api_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Message<'a> {
    app_token: &'a str,
    content: &'a str,
    summary: &'a str,
    content_type: u8,
    uids: &'a [String],
    topic_ids: &'a [String],
}

impl WxPusher {
    pub fn new(
        client: Client,
        app_token: impl Into<String>,
        uids: Vec<String>,
        topic_ids: Vec<String>,
    ) -> Self {
        Self {
            client,
            app_token: app_token.into(),
            uids,
            topic_ids,
            api_url: API_URL.to_string(),
        }
    }

    /// Override the API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn message<'a>(&'a self, title: &'a str, content: &'a str) -> Message<'a> {
        Message {
            app_token: &self.app_token,
            content,
            summary: title,
            content_type: CONTENT_TYPE_MARKDOWN,
            uids: &self.uids,
            topic_ids: &self.topic_ids,
        }
    }
}

#[async_trait]
impl Notifier for WxPusher {
    fn name(&self) -> &str {
        "WXPusher"
    }

    async fn send(&self, title: &str, content: &str) -> Result<()> {
        let body: Value = self
            .client
            .post(&self.api_url)
            .json(&self.message(title, content))
            .send()
            .await?
            .json()
            .await?;

        if body.get("code").and_then(Value::as_i64) == Some(CODE_OK) {
            Ok(())
        } else {
            Err(AppError::notify(self.name(), format!("rejected: {body}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_replying(body: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send/message"))
            .and(body_partial_json(json!({ "appToken": "AT_token", "contentType": 3 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn channel(server: &MockServer) -> WxPusher {
        WxPusher::new(Client::new(), "AT_token", vec!["UID_1".into()], Vec::new())
            .with_api_url(format!("{}/api/send/message", server.uri()))
    }

    #[test]
    fn test_message_shape() {
        let chan = WxPusher::new(
            Client::new(),
            "AT_token",
            vec!["UID_1".into()],
            Vec::new(),
        );
        let value = serde_json::to_value(chan.message("Daily", "# body")).unwrap();

        assert_eq!(
            value,
            json!({
                "appToken": "AT_token",
                "content": "# body",
                "summary": "Daily",
                "contentType": 3,
                "uids": ["UID_1"],
                "topicIds": []
            })
        );
    }

    #[tokio::test]
    async fn test_send_accepted() {
        let server = server_replying(json!({ "code": 1000, "msg": "处理成功" })).await;
        assert!(channel(&server).send("Daily", "# body").await.is_ok());
    }

    #[tokio::test]
    async fn test_send_rejected() {
        let server = server_replying(json!({ "code": 1001, "msg": "appToken error" })).await;

        let err = channel(&server).send("Daily", "# body").await.unwrap_err();
        assert!(matches!(err, AppError::Notify { ref channel, .. } if channel == "WXPusher"));
    }
}
