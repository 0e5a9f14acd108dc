// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report writer and reader.
//!
//! The writer is the only place a payload is encoded and the reader is the
//! only place it is decoded. The stored value is exactly the JSON text of
//! the payload, never a JSON string wrapping that text.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{ReportError, ReportResult};
use crate::id::{IdGenerator, RandomIdGenerator};
use crate::store::KvStore;
use crate::types::{ReportId, Ttl};

/// Creates write-once reports.
#[derive(Clone)]
pub struct ReportWriter {
    store: Arc<dyn KvStore>,
    ids: Arc<dyn IdGenerator>,
    ttl: Ttl,
}

impl ReportWriter {
    /// Writer backed by `store` using random identifiers.
    pub fn new(store: Arc<dyn KvStore>, ttl: Ttl) -> Self {
        Self::with_id_generator(store, Arc::new(RandomIdGenerator), ttl)
    }

    pub fn with_id_generator(store: Arc<dyn KvStore>, ids: Arc<dyn IdGenerator>, ttl: Ttl) -> Self {
        Self { store, ids, ttl }
    }

    /// Serialize `payload` and store it under a fresh identifier.
    ///
    /// Exactly one store write per successful call. Nothing is written if
    /// serialization fails, and a failed write is not retried.
    pub async fn write<T>(&self, payload: &T) -> ReportResult<ReportId>
    where
        T: Serialize + ?Sized,
    {
        let text = serde_json::to_string(payload)
            .map_err(|source| ReportError::Serialization { source })?;
        self.store_text(text).await
    }

    /// Store an already-serialized JSON document without re-encoding it.
    pub async fn write_raw(&self, json: &str) -> ReportResult<ReportId> {
        let raw: &RawValue =
            serde_json::from_str(json).map_err(|source| ReportError::InvalidJson { source })?;
        self.store_text(raw.get().to_string()).await
    }

    async fn store_text(&self, text: String) -> ReportResult<ReportId> {
        let id = self.ids.generate();
        let bytes = text.len();

        self.store
            .set_ex(id.as_str(), text, self.ttl)
            .await
            .map_err(|e| {
                tracing::error!(
                    operation = "write",
                    report_id = %id,
                    error = %e,
                    "Failed to store report"
                );
                ReportError::Store(e)
            })?;

        tracing::debug!(report_id = %id, bytes, ttl = %self.ttl, "Stored report");
        Ok(id)
    }
}

/// Looks up reports by identifier.
#[derive(Clone)]
pub struct ReportReader {
    store: Arc<dyn KvStore>,
}

impl ReportReader {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Fetch and decode the report stored under `id`.
    ///
    /// A missing or empty `id` is rejected before the store is touched.
    pub async fn read(&self, id: Option<&str>) -> ReportResult<Value> {
        self.read_as(id).await
    }

    /// The stored document exactly as it was written, without converting
    /// numbers or reordering keys.
    pub async fn read_raw(&self, id: Option<&str>) -> ReportResult<Box<RawValue>> {
        self.read_as(id).await
    }

    /// Like [`read`](Self::read), decoding straight into `T`.
    pub async fn read_as<T: DeserializeOwned>(&self, id: Option<&str>) -> ReportResult<T> {
        let (id, text) = self.fetch(id).await?;
        serde_json::from_str(&text).map_err(|source| {
            tracing::error!(
                operation = "read",
                report_id = %id,
                error = %source,
                "Stored report failed to decode"
            );
            ReportError::CorruptRecord {
                id: id.to_string(),
                source,
            }
        })
    }

    async fn fetch<'a>(&self, id: Option<&'a str>) -> ReportResult<(&'a str, String)> {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ReportError::MissingId),
        };

        let stored = self.store.get(id).await.map_err(|e| {
            tracing::error!(
                operation = "read",
                report_id = %id,
                error = %e,
                "Failed to fetch report"
            );
            ReportError::Store(e)
        })?;

        match stored {
            Some(text) => Ok((id, text)),
            None => {
                tracing::debug!(report_id = %id, "Report not found or expired");
                Err(ReportError::NotFound { id: id.to_string() })
            }
        }
    }
}
