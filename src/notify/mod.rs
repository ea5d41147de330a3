//! Outbound digest delivery.
//!
//! Channels are enabled by configuration and armed by credentials from the
//! environment. A channel without credentials is silently left out.

pub mod serverchan;
pub mod wxpusher;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::Result;
use crate::models::NotifyConfig;
use crate::utils::http;

pub use serverchan::ServerChan;
pub use wxpusher::WxPusher;

/// A message delivery channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Deliver one message.
    async fn send(&self, title: &str, content: &str) -> Result<()>;
}

/// Delivery result of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelResult {
    pub channel: String,
    pub delivered: bool,
}

/// Fan-out over every configured channel.
#[derive(Default)]
pub struct NotifierHub {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierHub {
    /// Hub with no channels.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build channels from configuration and process environment.
    pub fn from_env(config: &NotifyConfig) -> Result<Self> {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    /// Build channels from configuration and a credential lookup.
    pub fn from_lookup<F>(config: &NotifyConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut hub = Self::empty();

        if config.serverchan_enabled {
            if let Some(send_key) = lookup(serverchan::ENV_SEND_KEY) {
                let client = http::create_client(config)?;
                hub = hub.with_channel(Box::new(ServerChan::new(client, send_key)));
            }
        }

        if config.wxpusher_enabled {
            if let Some(app_token) = lookup(wxpusher::ENV_APP_TOKEN) {
                let uids = split_list(lookup(wxpusher::ENV_UIDS).as_deref());
                let topic_ids = split_list(lookup(wxpusher::ENV_TOPIC_IDS).as_deref());

                if uids.is_empty() && topic_ids.is_empty() {
                    log::warn!("WXPusher token set but no uids or topic ids; channel disabled");
                } else {
                    let client = http::create_client(config)?;
                    hub = hub.with_channel(Box::new(WxPusher::new(
                        client, app_token, uids, topic_ids,
                    )));
                }
            }
        }

        Ok(hub)
    }

    /// Add a channel.
    pub fn with_channel(mut self, channel: Box<dyn Notifier>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel names, in delivery order.
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Send on every channel concurrently and report each outcome.
    pub async fn send_each(&self, title: &str, content: &str) -> Vec<ChannelResult> {
        let sends = self.channels.iter().map(|channel| async move {
            let delivered = match channel.send(title, content).await {
                Ok(()) => {
                    log::info!("Sent via {}", channel.name());
                    true
                }
                Err(e) => {
                    log::warn!("{}", e);
                    false
                }
            };
            ChannelResult {
                channel: channel.name().to_string(),
                delivered,
            }
        });

        join_all(sends).await
    }

    /// Send on every channel; `true` if at least one delivered.
    pub async fn send_all(&self, title: &str, content: &str) -> bool {
        self.send_each(title, content)
            .await
            .iter()
            .any(|r| r.delivered)
    }
}

/// Split a comma-separated list, dropping empty items.
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;

    struct Fixed {
        name: &'static str,
        ok: bool,
    }

    #[async_trait]
    impl Notifier for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn send(&self, _title: &str, _content: &str) -> Result<()> {
            if self.ok {
                Ok(())
            } else {
                Err(AppError::notify(self.name, "rejected"))
            }
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_any_success_is_success() {
        let hub = NotifierHub::empty()
            .with_channel(Box::new(Fixed { name: "a", ok: false }))
            .with_channel(Box::new(Fixed { name: "b", ok: true }));

        let results = hub.send_each("t", "c").await;
        assert_eq!(results[0], ChannelResult { channel: "a".into(), delivered: false });
        assert_eq!(results[1], ChannelResult { channel: "b".into(), delivered: true });
        assert!(hub.send_all("t", "c").await);
    }

    #[tokio::test]
    async fn test_all_failed_or_none() {
        let hub = NotifierHub::empty().with_channel(Box::new(Fixed { name: "a", ok: false }));
        assert!(!hub.send_all("t", "c").await);
        assert!(!NotifierHub::empty().send_all("t", "c").await);
    }

    #[test]
    fn test_missing_credentials_disable_channels() {
        let hub = NotifierHub::from_lookup(&NotifyConfig::default(), env(&[])).unwrap();
        assert!(hub.is_empty());

        let hub = NotifierHub::from_lookup(
            &NotifyConfig::default(),
            env(&[(serverchan::ENV_SEND_KEY, "  ")]),
        )
        .unwrap();
        assert!(hub.is_empty());
    }

    #[test]
    fn test_serverchan_from_env() {
        let hub = NotifierHub::from_lookup(
            &NotifyConfig::default(),
            env(&[(serverchan::ENV_SEND_KEY, "SCT123")]),
        )
        .unwrap();
        assert_eq!(hub.channel_names(), vec!["ServerChan"]);
    }

    #[test]
    fn test_wxpusher_needs_opt_in_and_recipients() {
        let creds = [
            (wxpusher::ENV_APP_TOKEN, "AT_x"),
            (wxpusher::ENV_UIDS, "UID_1, UID_2,"),
        ];

        let hub = NotifierHub::from_lookup(&NotifyConfig::default(), env(&creds)).unwrap();
        assert!(hub.is_empty());

        let config = NotifyConfig {
            wxpusher_enabled: true,
            ..NotifyConfig::default()
        };
        let hub = NotifierHub::from_lookup(&config, env(&creds)).unwrap();
        assert_eq!(hub.channel_names(), vec!["WXPusher"]);

        let hub =
            NotifierHub::from_lookup(&config, env(&[(wxpusher::ENV_APP_TOKEN, "AT_x")])).unwrap();
        assert!(hub.is_empty());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("a, b,,c ")), vec!["a", "b", "c"]);
        assert!(split_list(None).is_empty());
    }
}
