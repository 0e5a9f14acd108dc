//! reportbin Core Library
//!
//! Report persistence for reportbin: a client submits a JSON document,
//! receives a short opaque identifier, and readers fetch the document by
//! that identifier until it expires. Provides identifier generation, the
//! key-value store contract with an in-memory backend, the report writer
//! and reader, and configuration parsing.

pub mod config;
pub mod error;
pub mod id;
pub mod report;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, ReportConfig, ServerConfig, StoreBackend};
pub use error::{ConfigError, ErrorClass, ReportError, ReportResult, StoreError};
pub use id::{IdGenerator, RandomIdGenerator};
pub use report::{ReportReader, ReportWriter};
pub use store::{KvStore, MemoryStore};
pub use types::{Port, ReportId, Ttl};
