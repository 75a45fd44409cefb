//! Demo that sends one sample news embed to the configured Discord webhook.

use chrono::Utc;
use ddo_news_herald::{DiscordNotifier, EnrichedPost, Publish};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let webhook = std::env::var("DISCORD_WEBHOOK_URL").expect("DISCORD_WEBHOOK_URL must be set");
    let notifier = DiscordNotifier::new(webhook);

    let post = EnrichedPost {
        title: "Sample news post".into(),
        date: Utc::now(),
        link: Some("https://www.ddo.com/en/news".into()),
        image: None,
        desc: Some("If you can read this in your channel, the webhook works.".into()),
    };

    match notifier.publish(&post).await {
        Ok(()) => println!("notify-demo sent"),
        Err(e) => eprintln!("notify-demo failed: {e}"),
    }
}
