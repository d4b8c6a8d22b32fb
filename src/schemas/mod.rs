pub mod schema;
pub(crate) mod validation;

pub use schema::{estimate_schema, SchemaHandle};
