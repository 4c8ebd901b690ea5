//! Stencil Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Stencil, a
//! block-preserving code generator for modules, interfaces and type
//! namespaces described by YAML/JSON manifests.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stencil-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (GenerationService, resolvers, merger)  │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Driven: Validator, Renderer, Files)    │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    stencil-adapters (Infrastructure)    │
//! │ (SerdeValidator, TeraRenderer, LocalFs) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (TypeRef, ordering, BlockPreservingMerger)│
//! │         No I/O                          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stencil_core::prelude::*;
//!
//! let service = GenerationService::new(
//!     ProjectLayout::new("."),
//!     Box::new(validator),
//!     Box::new(renderer),
//!     Box::new(filesystem),
//! );
//! let report = service.generate_module(&ModuleRequest {
//!     name: "EvseManager".into(),
//!     update: true,
//!     ..Default::default()
//! })?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

#[cfg(test)]
mod testing;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArtifactAction, GenerationService, ModuleRequest, ProjectLayout, RunOptions, RunReport,
        ports::{Filesystem, ManifestValidator, TemplateRenderer},
    };
    pub use crate::domain::{ManifestKind, ValidatedManifest, WritePolicy};
    pub use crate::error::{StencilError, StencilResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
