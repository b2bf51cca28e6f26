use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;

#[derive(Deserialize, PartialEq)]
struct Subscriber {
    chat_id: i64,
}

#[derive(Deserialize)]
struct SubscribersResponse {
    result: Option<Vec<Subscriber>>,
}

pub fn notify_block_producer_creation_async(config: &AppConfig, block_producer_id: i32) {
    notify_async(config, block_producer_id, "created");
}

pub fn notify_block_producer_update_async(config: &AppConfig, block_producer_id: i32) {
    notify_async(config, block_producer_id, "updated");
}

fn notify_async(config: &AppConfig, block_producer_id: i32, action: &'static str) {
    let config = config.clone();
    actix_web::rt::spawn(async move {
        if let Err(err) = notify(&config, block_producer_id, action).await {
            error!("telegram notify failed: {}", err);
        }
    });
}

async fn notify(
    config: &AppConfig,
    block_producer_id: i32,
    action: &str,
) -> Result<(), reqwest::Error> {
    if config.telegram_bot_token.is_empty() || config.telegram_bot_host.is_empty() {
        return Ok(());
    }

    let client = reqwest::Client::new();
    let subscribers = client
        .get(format!(
            "{}/subscribers/block-producer/creation",
            config.telegram_bot_host
        ))
        .send()
        .await?
        .json::<SubscribersResponse>()
        .await?
        .result
        .unwrap_or_default();

    let administrators = client
        .get(format!("{}/administrators", config.telegram_bot_host))
        .send()
        .await?
        .json::<SubscribersResponse>()
        .await?
        .result
        .unwrap_or_default();

    let link_to_moderate = format!(
        "{}/admin/block-producers/{}",
        config.admin_host, block_producer_id
    );

    for subscriber in &subscribers {
        let mut message = format!(
            "Block producer with identifier {} has been {}.",
            block_producer_id, action
        );
        if administrators.contains(subscriber) {
            message.push_str(&format!(
                "\nTo moderate use following [link]({}).",
                link_to_moderate
            ));
        }
        send_message(config, &client, subscriber.chat_id, &message).await?;
    }
    Ok(())
}

async fn send_message(
    config: &AppConfig,
    client: &reqwest::Client,
    chat_id: i64,
    message: &str,
) -> Result<(), reqwest::Error> {
    client
        .post(format!(
            "https://api.telegram.org/bot{}/sendMessage",
            config.telegram_bot_token
        ))
        .json(&json!({
            "chat_id": chat_id,
            "text": message,
            "parse_mode": "Markdown",
        }))
        .send()
        .await?;
    Ok(())
}
