// Request handlers, one per exposure shape. Each owns its store(s) and an
// immutable config struct, and routes verbs through the dispatch boundary.

pub mod crud;
pub mod list;
pub mod relation;

pub use crud::{CrudConfig, CrudHandler};
pub use list::{ListConfig, ListHandler};
pub use relation::{RelationConfig, RelationHandler};
