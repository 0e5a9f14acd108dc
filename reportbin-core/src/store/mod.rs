// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Key-value store contract.
//!
//! Reports live in an external key-value service with GET and
//! SET-with-expiry semantics. Expiry is enforced by the backend; the only
//! observable effect here is that `get` starts returning `None`.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::Ttl;

/// A string-to-string map with per-key expiry.
///
/// Implementations must give atomic visibility of a completed `set_ex`:
/// a concurrent `get` sees either nothing or the whole value.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Fetch the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: String, ttl: Ttl) -> Result<(), StoreError>;
}
