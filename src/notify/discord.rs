use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Publish;
use crate::post::EnrichedPost;

const EMBED_COLOR: u32 = 0x006699;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    async fn send_payload(&self, payload: &DiscordWebhookPayload) -> Result<()> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("Discord webhook HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook request failed: {e}"));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Publish for DiscordNotifier {
    async fn publish(&self, post: &EnrichedPost) -> Result<()> {
        let payload = DiscordWebhookPayload::for_post(post);
        self.send_payload(&payload).await
    }
}

#[derive(Serialize)]
struct DiscordEmbed {
    author: EmbedAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedImage>,
    color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField>,
}

#[derive(Serialize)]
struct EmbedAuthor {
    name: String,
}

#[derive(Serialize)]
struct EmbedImage {
    url: String,
}

#[derive(Serialize)]
struct EmbedField {
    name: String,
    value: String,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn for_post(post: &EnrichedPost) -> Self {
        let fields = post
            .link
            .iter()
            .map(|link| EmbedField {
                name: "Full news:".to_string(),
                value: link.clone(),
            })
            .collect();

        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                author: EmbedAuthor {
                    name: post.title.clone(),
                },
                description: post.desc.clone(),
                image: post.image.clone().map(|url| EmbedImage { url }),
                color: EMBED_COLOR,
                fields,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn payload_carries_title_image_and_link_field() {
        let post = EnrichedPost {
            title: "Update 60 Released".into(),
            date: Utc::now(),
            link: Some("https://www.ddo.com/en/news/update-60".into()),
            image: Some("https://www.ddo.com/img/u60.jpg".into()),
            desc: Some("Highlights of the update.".into()),
        };
        let json = serde_json::to_value(DiscordWebhookPayload::for_post(&post)).unwrap();
        let embed = &json["embeds"][0];
        assert_eq!(embed["author"]["name"], "Update 60 Released");
        assert_eq!(embed["image"]["url"], "https://www.ddo.com/img/u60.jpg");
        assert_eq!(embed["fields"][0]["name"], "Full news:");
        assert_eq!(embed["color"], 0x006699);
    }

    #[test]
    fn optional_parts_are_omitted() {
        let post = EnrichedPost {
            title: "No frills".into(),
            date: Utc::now(),
            link: None,
            image: None,
            desc: None,
        };
        let json = serde_json::to_value(DiscordWebhookPayload::for_post(&post)).unwrap();
        let embed = &json["embeds"][0];
        assert!(embed.get("image").is_none());
        assert!(embed.get("description").is_none());
        assert!(embed.get("fields").is_none());
    }
}
