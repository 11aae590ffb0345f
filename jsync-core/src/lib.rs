//! Declare-once field bindings between Rust objects and JSON document trees.
//!
//! An object lists its fields once, in [`Aggregate::declare`], and that
//! single declaration drives both saving to and loading from a
//! `serde_json::Value`:
//!
//! - [`Fields`] / [`FieldBinding`] — the call-scoped binding list and the
//!   scalar-vs-delegate dispatch fixed per field type
//! - [`Aggregate`] / [`Syncable`] — the declare → dispatch → hook lifecycle
//!   and the save/load capability it provides
//! - [`Sequence`] and [`Associative`] — homogeneous containers
//! - [`PolymorphicSequence`] and [`PolymorphicAssociative`] — containers of
//!   runtime-variant elements rebuilt by a discriminator-keyed [`Factory`]
//!
//! Everything runs synchronously on the calling thread. Nothing here is
//! `Sync`; callers that share a root across threads must serialize access.

pub mod document;

mod aggregate;
mod associative;
mod binding;
mod error;
mod format;
mod polymorphic;
mod sequence;

pub use aggregate::{Aggregate, Syncable};
pub use associative::Associative;
pub use binding::{Field, FieldBinding, Fields, Strategy};
pub use error::{SyncError, SyncResult};
pub use format::DocumentFormat;
pub use polymorphic::{Factory, Handle, PolymorphicAssociative, PolymorphicEntry, PolymorphicSequence};
pub use sequence::Sequence;
