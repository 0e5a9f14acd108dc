// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Hosted Redis backend over the Upstash REST API.
//!
//! Each command is a JSON array POSTed to the endpoint root with a bearer
//! token; replies are `{"result": ...}` or `{"error": "..."}`. Values are
//! returned exactly as stored. No client-side JSON decoding of results
//! happens here, the report reader owns that step.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use reportbin_core::{KvStore, StoreError, Ttl};

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Value,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpstashStore {
    client: Client,
    url: String,
    token: String,
}

impl UpstashStore {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Unavailable {
                reason: format!("building HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url: url.into(),
            token: token.into(),
        })
    }

    async fn command(&self, args: &[&str]) -> Result<Value, StoreError> {
        let name = args.first().copied().unwrap_or_default();

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                reason: format!("{}: {}", name, e),
            })?;

        let status = resp.status();
        let reply: Option<RestReply> = resp.json().await.ok();

        if !status.is_success() {
            let reason = reply
                .and_then(|r| r.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        match reply {
            Some(RestReply {
                error: Some(error), ..
            }) => Err(StoreError::Rejected {
                status: status.as_u16(),
                reason: error,
            }),
            Some(reply) => Ok(reply.result),
            None => Err(StoreError::Protocol {
                reason: format!("{}: reply was not a REST result object", name),
            }),
        }
    }
}

#[async_trait]
impl KvStore for UpstashStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.command(&["GET", key]).await? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            other => Err(StoreError::Protocol {
                reason: format!("GET returned non-string result: {}", other),
            }),
        }
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Ttl) -> Result<(), StoreError> {
        let secs = ttl.secs().to_string();
        match self.command(&["SET", key, &value, "EX", &secs]).await? {
            Value::String(ok) if ok == "OK" => Ok(()),
            other => Err(StoreError::Protocol {
                reason: format!("SET returned {}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeRedis {
        data: Arc<Mutex<HashMap<String, String>>>,
        commands: Arc<Mutex<Vec<Vec<String>>>>,
    }

    async fn fake_handler(
        State(fake): State<FakeRedis>,
        headers: HeaderMap,
        Json(args): Json<Vec<String>>,
    ) -> (StatusCode, Json<Value>) {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer t0ken") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Unauthorized"})),
            );
        }
        fake.commands.lock().unwrap().push(args.clone());
        match args.first().map(String::as_str) {
            Some("SET") => {
                fake.data
                    .lock()
                    .unwrap()
                    .insert(args[1].clone(), args[2].clone());
                (StatusCode::OK, Json(serde_json::json!({"result": "OK"})))
            }
            Some("GET") => {
                let value = fake.data.lock().unwrap().get(&args[1]).cloned();
                (StatusCode::OK, Json(serde_json::json!({ "result": value })))
            }
            _ => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "ERR unknown command"})),
            ),
        }
    }

    async fn spawn_fake() -> (String, FakeRedis) {
        let fake = FakeRedis::default();
        let app = Router::new()
            .route("/", post(fake_handler))
            .with_state(fake.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), fake)
    }

    #[tokio::test]
    async fn test_set_sends_expiry() {
        let (url, fake) = spawn_fake().await;
        let store = UpstashStore::new(&url, "t0ken").unwrap();

        store
            .set_ex("abcd1234", r#"{"a":1}"#.to_string(), Ttl::from_secs(10_800).unwrap())
            .await
            .unwrap();

        let commands = fake.commands.lock().unwrap().clone();
        assert_eq!(
            commands,
            vec![vec!["SET", "abcd1234", r#"{"a":1}"#, "EX", "10800"]]
        );
    }

    #[tokio::test]
    async fn test_get_returns_stored_text_verbatim() {
        let (url, _fake) = spawn_fake().await;
        let store = UpstashStore::new(&url, "t0ken").unwrap();

        store
            .set_ex("abcd1234", r#"{"a":1}"#.to_string(), Ttl::default())
            .await
            .unwrap();
        let value = store.get("abcd1234").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (url, _fake) = spawn_fake().await;
        let store = UpstashStore::new(&url, "t0ken").unwrap();
        assert_eq!(store.get("missing0").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bad_token_is_rejected() {
        let (url, _fake) = spawn_fake().await;
        let store = UpstashStore::new(&url, "wrong").unwrap();

        let err = store.get("abcd1234").await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = UpstashStore::new(format!("http://{}", addr), "t0ken").unwrap();
        let err = store.get("abcd1234").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }
}
