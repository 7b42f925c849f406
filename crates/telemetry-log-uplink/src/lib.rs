//! Log collection and upload core for the device-side telemetry client.
//!
//! This crate buffers application log records locally, decides autonomously
//! when to upload or discard them, serializes pending records into a
//! length-bounded wire batch and reconciles server acknowledgments back into
//! the buffer's lifecycle.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────┐
//!                  │ Application  │  (produces log entries)
//!                  └──────┬───────┘
//!                         │ add_record
//!                         v
//!                  ┌──────────────┐     ┌───────────────┐
//!                  │ LogCollector │────>│ UploadPolicy  │
//!                  └──────┬───────┘     └───────┬───────┘
//!                         │                     │ Upload / Cleanup
//!                         v                     v
//!                  ┌──────────────┐     ┌───────────────┐
//!                  │  LogStorage  │     │ Sync trigger  │
//!                  └──────┬───────┘     └───────────────┘
//!                         │ build_request / handle_response
//!                         v
//!                  ┌──────────────┐
//!                  │  Transport   │  (out of scope, interface only)
//!                  └──────────────┘
//! ```
//!
//! # Components
//!
//! - [`collector`]: the [`LogCollector`] orchestrator
//! - [`storage`]: the pluggable [`LogStorage`] backend contract
//! - [`memory`]: in-memory reference backend
//! - [`policy`]: upload decision policy
//! - [`wire`]: bounded frame writer/reader and the extension codec
//! - [`status`]: durable port for the batch counter
//! - [`transport`]: sync-trigger interface boundary
//!
//! # Delivery Guarantees
//!
//! A record is owned by the backend from acceptance until it is acknowledged
//! or evicted. No retry logic lives in this core: retry is an emergent
//! property of the backend re-offering failed records and of the policy
//! re-triggering an upload.

pub mod collector;
pub mod constants;
pub mod error;
pub mod memory;
pub mod policy;
pub mod properties;
pub mod record;
pub mod status;
pub mod storage;
pub mod transport;
pub mod wire;

pub use collector::LogCollector;
pub use error::{Result, UplinkError};
pub use memory::{MemoryLogStorage, MemoryStorageStatus};
pub use policy::{DefaultUploadPolicy, UploadDecision, UploadPolicy};
pub use properties::UploadProperties;
pub use record::{LogEntry, LogRecord};
pub use status::{InMemoryStatusStore, StatusStore};
pub use storage::{LogStorage, StorageStatus, StorageStatusView};
pub use transport::{NoopTransportRegistry, ServiceKind, SyncHandler, TransportRegistry};
