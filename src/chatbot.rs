//! Chat webhook notifications.
//!
//! Playlist workers report their results through a simple messaging webhook.
//! Delivery is strictly best effort: a failed or misconfigured webhook is
//! logged and never fails a sync run. Messages longer than the platform
//! limit are split on line boundaries and sent as separate requests.

use serde_json::json;

use crate::types::ChatAlert;
use crate::utils::chunk_lines;
use crate::warning;

/// Platform limit on a single message body.
const MESSAGE_LIMIT: usize = 2000;

/// Sends `text` to the given chat recipient, chunked to the platform limit.
///
/// Does nothing when `alert.notify` is off or the recipient id is empty.
/// Errors are logged per chunk and swallowed.
pub async fn send_message(chat_id: &str, alert: &ChatAlert, text: &str) {
    if !alert.notify || chat_id.is_empty() {
        return;
    }

    let client = reqwest::Client::new();
    for chunk in chunk_lines(MESSAGE_LIMIT, text) {
        let body = json!({
            "recipient": { "id": chat_id },
            "message": { "text": chunk.trim_end() },
        });

        let result = client
            .post(&alert.url)
            .query(&[("access_token", &alert.key)])
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                warning!(
                    "chat delivery to {} failed with status {}",
                    chat_id,
                    response.status()
                );
            }
            Err(err) => {
                warning!("chat delivery to {} failed: {}", chat_id, err);
            }
        }
    }
}
