// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stencil.
//!
//! This module contains pure logic: the manifest model, type references,
//! dependency ordering and the block-preserving merge. All I/O, validation
//! and rendering concerns are handled via ports (traits) defined in the
//! application layer.
//!
//! - **No I/O**: No filesystem or external calls
//! - **Deterministic**: Same inputs always give the same output
//! - **Immutable results**: Resolved types are never mutated after ordering

pub mod blocks;
pub mod entities;
pub mod error;
pub mod merge;
pub mod naming;
pub mod ordering;
pub mod value_objects;

pub use entities::{
    artifact::{ArtifactKind, ArtifactSelection, GeneratedArtifact, WHICH_FILTER},
    block::{BlockMarker, BlockSchema, BlockSlot, CustomBlockInstance, MARKER_SENTINEL},
    manifest::{
        CommandDefinition, InterfaceDefinition, ModuleManifest, OPTIONAL_REQUIREMENT_PREFIX,
        ProvidedImplementation, RequiredConnection, TypeFile, ValidatedManifest,
    },
    resolved::{
        EnumDefinition, OrderedTypeSequence, ResolvedCommand, ResolvedImplementation,
        ResolvedInterface, ResolvedModule, ResolvedProperty, ResolvedRequirement, ResolvedType,
        TypeDescriptor, TypeNamespace,
    },
    schema::{KindSpec, Schema, SchemaShape},
    type_ref::{QualifiedRef, TYPES_DIR, TypeRef, namespace_after_marker, namespace_header},
};

pub use error::{DomainError, ErrorCategory};
pub use merge::{BlockPreservingMerger, MergeOutcome, MergeState, VersionMismatch};
pub use ordering::order_types;
pub use value_objects::{JsonKind, ManifestKind, TypeKind, WritePolicy};

#[cfg(test)]
mod tests {
    use super::*;

    /// Render a file the way the built-in templates do: tag, default, tag.
    fn render(schema: &BlockSchema, body: &str) -> String {
        let slots = schema.template_slots();
        let mut out = String::from("#pragma once\n\n");
        for name in ["add_headers", "public_defs", "private_defs"] {
            let slot = &slots[name];
            out.push_str(&format!("{}\n{}{}\n", slot.tag, slot.content, slot.tag));
            out.push_str(body);
        }
        out
    }

    #[test]
    fn builtin_slots_merge_back_into_themselves() {
        let schema = blocks::module_header();
        let merger = BlockPreservingMerger::new(schema);
        let first = render(schema, "");

        let blocks = merger.extract(&first).unwrap();
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| schema.marker(b.marker_id).is_some()));

        let outcome = merger.merge(Some(&first), &first).unwrap();
        assert_eq!(outcome.content, first);
        assert_eq!(outcome.preserved.len(), 3);
    }

    #[test]
    fn edited_builtin_block_survives_template_change() {
        let schema = blocks::module_header();
        let merger = BlockPreservingMerger::new(schema);

        let edited = render(schema, "").replace(
            "// insert your private definitions here\n",
            "std::mutex lock_;\n",
        );
        let outcome = merger.merge(Some(&edited), &render(schema, "// new line\n")).unwrap();

        assert!(outcome.content.contains("std::mutex lock_;\n"));
        assert!(outcome.content.contains("// new line\n"));
        assert!(!outcome.content.contains("insert your private definitions"));
        assert_eq!(outcome.state, MergeState::Merged);
    }

    #[test]
    fn module_header_and_cmake_markers_do_not_cross_match() {
        let cmake = blocks::cmake();
        let header = blocks::module_header();
        for marker in header.markers() {
            assert!(cmake.match_line(&header.tag(marker.id)).is_none());
        }
    }
}
