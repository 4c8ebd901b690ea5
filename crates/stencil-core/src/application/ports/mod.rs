//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `stencil-adapters` implement these.
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `ManifestValidator`: Manifest parsing and validation
//!   - `TemplateRenderer`: Template rendering

pub mod output;

pub use output::{Filesystem, ManifestValidator, TemplateRenderer};

#[cfg(test)]
pub use output::MockFilesystem;
