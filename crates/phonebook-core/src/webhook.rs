//! Demonstration webhook: POST a created or updated contact as JSON.
//!
//! Runs on its own thread so no machine transition ever waits on it. The
//! result is only for notifying the user; it is never retried and never
//! touches the contact list.

use crate::contact::Contact;
use crate::error::{PhonebookError, Result};
use std::thread::JoinHandle;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn post_contact(url: &str, contact: &Contact, timeout: Duration) -> Result<serde_json::Value> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PhonebookError::Webhook(e.to_string()))?;

    let resp = client
        .post(url)
        .json(contact)
        .send()
        .map_err(|e| PhonebookError::Webhook(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PhonebookError::Webhook(format!("{url} responded {status}")));
    }
    resp.json::<serde_json::Value>()
        .map_err(|e| PhonebookError::Webhook(format!("invalid JSON response: {e}")))
}

/// Fire-and-forget [`post_contact`]. Joining the handle is optional.
pub fn spawn_post(
    url: String,
    contact: Contact,
    timeout: Duration,
) -> JoinHandle<Result<serde_json::Value>> {
    std::thread::spawn(move || {
        let result = post_contact(&url, &contact, timeout);
        match &result {
            Ok(_) => tracing::info!(id = contact.id, url = %url, "webhook delivered"),
            Err(e) => tracing::warn!(id = contact.id, url = %url, error = %e, "webhook failed"),
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn ada() -> Contact {
        Contact {
            phone_number: Some("555-0100".into()),
            ..Contact::new(1, "Ada Lovelace")
        }
    }

    #[test]
    fn posts_contact_json() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/hook")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "id": 1,
                "name": "Ada Lovelace",
                "phoneNumber": "555-0100"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"received":true}"#)
            .create();

        let value = post_contact(&format!("{}/hook", server.url()), &ada(), DEFAULT_TIMEOUT).unwrap();
        assert_eq!(value["received"], true);
        mock.assert();
    }

    #[test]
    fn error_status_is_reported() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("POST", "/hook").with_status(500).create();

        let err = post_contact(&format!("{}/hook", server.url()), &ada(), DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, PhonebookError::Webhook(_)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn spawned_post_reports_unreachable_host() {
        let handle = spawn_post(
            "http://127.0.0.1:9/hook".to_string(),
            ada(),
            Duration::from_secs(2),
        );
        assert!(handle.join().unwrap().is_err());
    }
}
