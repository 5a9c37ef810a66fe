//! Overlay configuration: schema, validated edits and the JSON store.

mod schema;
mod store;

pub use schema::*;
pub use store::*;
