//! Shared vocabulary for the live editing protocol: identifiers and the
//! capabilities they bind, persisted record shapes, typed style values,
//! store namespaces and user-facing notifications.

pub mod binding;
pub mod error;
pub mod namespace;
pub mod notification;
pub mod record;
pub mod value;

pub use binding::*;
pub use error::*;
pub use namespace::*;
pub use notification::*;
pub use record::*;
pub use value::*;
