pub mod artifact;
pub mod block;
pub mod manifest;
pub mod resolved;
pub mod schema;
pub mod type_ref;
