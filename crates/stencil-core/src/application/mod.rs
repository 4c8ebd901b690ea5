//! Application layer for Stencil.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GenerationService and the resolvers it drives)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Layout**: Where manifests live and where generated files go
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. Merging, ordering and naming rules live in
//! `crate::domain`.

pub mod error;
pub mod layout;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    ArtifactAction, ArtifactReport, GenerationService, ModuleRequest, RunOptions, RunReport,
    SkippedItem,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, ManifestValidator, TemplateRenderer};

pub use error::ApplicationError;
pub use layout::ProjectLayout;
