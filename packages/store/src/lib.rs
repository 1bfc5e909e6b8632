//! # Persistence Adapter
//!
//! Identifier-keyed documents and binary assets behind two object-safe async
//! traits:
//!
//! - [`DocumentStore`]: `get` (absence is `Ok(None)`, never an error),
//!   merge-`put` stamped with a server-assigned `lastModified`, `delete`.
//! - [`BlobStore`]: `upload` returning a retrievable URL, `delete` by URL.
//!
//! [`RecordStore`] layers typed content/style records over any document store.
//! Implementations: in-memory ([`MemoryStore`], [`MemoryBlobStore`]),
//! file-backed ([`FileStore`], [`FileBlobStore`]) and a fault-injecting
//! wrapper for tests ([`FailingStore`]).

mod blob;
mod document;
mod error;
mod file;
mod memory;
mod mock;
mod records;

pub use blob::BlobStore;
pub use document::{validate_key, DocumentStore, Fields};
pub use error::{StoreError, StoreResult};
pub use file::{FileBlobStore, FileStore};
pub use memory::{MemoryBlobStore, MemoryStore};
pub use mock::FailingStore;
pub use records::RecordStore;
