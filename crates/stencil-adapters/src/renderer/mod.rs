//! Template rendering backed by Tera.

mod engine;
mod filters;

pub use engine::{BUILTIN_TEMPLATES, TeraRenderer};
