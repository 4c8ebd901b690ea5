// ============================================================================
// domain/error.rs - RESOLUTION, ORDERING AND MERGE FAILURES
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (collected per artifact, re-reported at the end of a run)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Reference Errors
    // ========================================================================
    #[error("Malformed type reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("Type reference '{reference}' points to missing type file '{path}'")]
    UnresolvedType { reference: String, path: String },

    #[error("Type '{type_name}' is not defined in '{path}' (referenced as '{reference}')")]
    UndefinedType {
        reference: String,
        path: String,
        type_name: String,
    },

    #[error("Type reference '{reference}' expects kind '{expected}' but the type is declared as '{found}'")]
    KindMismatch {
        reference: String,
        expected: String,
        found: String,
    },

    // ========================================================================
    // Graph Errors
    // ========================================================================
    #[error("Cyclic interface inheritance: {}", chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },

    #[error("Cyclic type dependency in namespace '{namespace}': {}", cycle.join(" -> "))]
    CyclicTypeDependency {
        namespace: String,
        cycle: Vec<String>,
    },

    // ========================================================================
    // Definition Errors
    // ========================================================================
    #[error("Invalid identifier '{name}' in {context}: {reason}")]
    InvalidIdentifier {
        name: String,
        context: String,
        reason: String,
    },

    #[error("Type '{name}' is defined twice (second definition in '{declared_by}')")]
    DuplicateType { name: String, declared_by: String },

    #[error("Unsupported schema for '{name}': {reason}")]
    UnsupportedSchema { name: String, reason: String },

    #[error("Expected a {expected} manifest but the validator produced a {found} manifest")]
    UnexpectedManifest { expected: String, found: String },

    // ========================================================================
    // Regeneration Errors
    // ========================================================================
    #[error("Ambiguous custom block markers at line {line}: {reason}")]
    MergeAmbiguity { line: usize, reason: String },

    #[error("Custom block {marker} at line {line} has no place in the regenerated file")]
    OrphanedBlock { marker: String, line: usize },

    #[error("Unknown artifact filter(s): {} (available: {})", unknown.join(", "), available.join(", "))]
    UnknownArtifactFilter {
        unknown: Vec<String>,
        available: Vec<String>,
    },

    #[error("Invalid block schema '{family}': {reason}")]
    InvalidBlockSchema { family: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MalformedReference { .. } => vec![
                "Global references look like '/<namespace>#/<TypeName>'".into(),
                "or '<path>/types/<namespace>.yaml#/<TypeName>'".into(),
            ],
            Self::UnresolvedType { path, .. } => vec![
                format!("Create the type file '{path}'"),
                "Or fix the namespace part of the reference".into(),
            ],
            Self::UndefinedType { type_name, path, .. } => vec![
                format!("Add '{type_name}' to the 'types' table of '{path}'"),
                "Check the spelling of the type name".into(),
            ],
            Self::KindMismatch { expected, .. } => vec![
                format!("Change the 'type' of the referencing schema to '{expected}'"),
                "Or point the reference at a type of the declared kind".into(),
            ],
            Self::CyclicInheritance { chain } => vec![
                format!("Break the cycle {}", chain.join(" -> ")),
                "An interface may not (indirectly) inherit from itself".into(),
            ],
            Self::CyclicTypeDependency { cycle, .. } => vec![
                format!("Types {} refer to each other", cycle.join(", ")),
                "Introduce an indirection (array or separate namespace) to break the cycle".into(),
            ],
            Self::InvalidIdentifier { .. } => vec![
                "Identifiers must start with a letter or '_' and contain only [A-Za-z0-9_]".into(),
                "Reserved words of the generated language are not allowed".into(),
            ],
            Self::DuplicateType { name, .. } => vec![
                format!("Rename one of the '{name}' definitions"),
                "Inline enum and object types are named after their property".into(),
            ],
            Self::MergeAmbiguity { line, .. } => vec![
                format!("Inspect the custom block markers around line {line}"),
                "Every marker line must be closed by an identical marker line".into(),
                "Use --force to regenerate the file from scratch (discards custom code)".into(),
            ],
            Self::OrphanedBlock { line, .. } => vec![
                format!("Move the code of the block at line {line} into a block the template still has"),
                "Use --force to regenerate anyway (the orphaned block is dropped)".into(),
            ],
            Self::UnknownArtifactFilter { available, .. } => vec![
                format!("Available artifacts: {}", available.join(", ")),
                "Use '--only which' to list them".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedReference { .. }
            | Self::InvalidIdentifier { .. }
            | Self::DuplicateType { .. }
            | Self::UnsupportedSchema { .. }
            | Self::UnknownArtifactFilter { .. } => ErrorCategory::Validation,
            Self::KindMismatch { .. }
            | Self::CyclicInheritance { .. }
            | Self::CyclicTypeDependency { .. }
            | Self::MergeAmbiguity { .. }
            | Self::OrphanedBlock { .. } => ErrorCategory::Consistency,
            Self::UnresolvedType { .. } | Self::UndefinedType { .. } => ErrorCategory::NotFound,
            Self::UnexpectedManifest { .. } | Self::InvalidBlockSchema { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Consistency,
    NotFound,
    Internal,
}
