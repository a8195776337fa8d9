//! Local persistence for the wedding graph.
//!
//! [`Graph`] is the in-memory model with all relational rules (unique ids,
//! parent links, cascade and nullify deletes). [`Store`] wraps a graph in a
//! single owning task backed by SQLite; everything else talks to it through a
//! [`StoreHandle`].

mod actor;
mod error;
mod graph;
mod query;
pub(crate) mod record;

pub use actor::{Store, StoreHandle};
pub use error::StoreError;
pub use graph::{ChangeSet, Graph, MergeOutcome};
pub use query::WeddingQuery;
pub use record::{DeleteRule, Entity, EntityKind, Record};
