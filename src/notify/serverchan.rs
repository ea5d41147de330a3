//! ServerChan (Server酱) push channel.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::notify::Notifier;

/// Environment variable holding the send key.
pub const ENV_SEND_KEY: &str = "SERVERCHAN_SENDKEY";

const BASE_URL: &str = "https://sctapi.ftqq.com";

/// ServerChan channel: form POST to `/<send_key>.send`.
pub struct ServerChan {
    client: Client,
    send_key: String,
    base_url: String,
}

impl ServerChan {
    pub fn new(client: Client, send_key: impl Into<String>) -> Self {
        Self {
            client,
            send_key: send_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}.send", self.base_url.trim_end_matches('/'), self.send_key)
    }
}

/// ServerChan reports success as `code == 0` or, on older APIs, `data.errno == 0`.
fn accepted(body: &Value) -> bool {
    body.get("code").and_then(Value::as_i64) == Some(0)
        || body.pointer("/data/errno").and_then(Value::as_i64) == Some(0)
}

#[async_trait]
impl Notifier for ServerChan {
    fn name(&self) -> &str {
        "ServerChan"
    }

    async fn send(&self, title: &str, content: &str) -> Result<()> {
        let body: Value = self
            .client
            .post(self.endpoint())
            .form(&[("title", title), ("desp", content)])
            .send()
            .await?
            .json()
            .await?;

        if accepted(&body) {
            Ok(())
        } else {
            Err(AppError::notify(self.name(), format!("rejected: {body}")))
        }
    }
}
