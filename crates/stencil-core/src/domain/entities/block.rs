//! Custom block markers.
//!
//! A custom block is the text between two identical marker lines:
//!
//! ```text
//! // stencil@a18196b1-99c0-41fa-bcd7-187782076e00:v1
//! ... hand-written code, kept across regenerations ...
//! // stencil@a18196b1-99c0-41fa-bcd7-187782076e00:v1
//! ```
//!
//! Identity is the UUID. The version after `:` is informational.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Sentinel between the comment prefix and the UUID.
pub const MARKER_SENTINEL: &str = "stencil@";

const UUID_V4_PATTERN: &str =
    "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}";

/// One well-known custom region of a file family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMarker {
    pub name: String,
    pub id: Uuid,
    pub version: String,
    pub default_content: String,
}

/// Content captured from an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomBlockInstance {
    pub marker_id: Uuid,
    pub captured_content: String,
    /// Version found on the opening marker line.
    pub version: String,
    /// 1-based line of the opening marker.
    pub line: usize,
}

/// A marker line matched in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerLine<'t> {
    pub id: Uuid,
    pub version: &'t str,
}

/// Marker tag and default content handed to templates per block name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSlot {
    pub tag: String,
    pub content: String,
}

/// The set of markers a file family (module header, CMake list, ...) uses.
#[derive(Debug, Clone)]
pub struct BlockSchema {
    family: String,
    comment_prefix: String,
    version: String,
    markers: Vec<BlockMarker>,
    pattern: Regex,
}

impl BlockSchema {
    /// Build a schema. `markers` are `(name, id, default_content)`.
    pub fn new<'a>(
        family: impl Into<String>,
        comment_prefix: impl Into<String>,
        version: impl Into<String>,
        markers: impl IntoIterator<Item = (&'a str, Uuid, &'a str)>,
    ) -> Result<Self, DomainError> {
        let family = family.into();
        let comment_prefix = comment_prefix.into();
        let version = version.into();

        let invalid = |reason: String| DomainError::InvalidBlockSchema {
            family: family.clone(),
            reason,
        };

        if comment_prefix.trim().is_empty() {
            return Err(invalid("comment prefix is empty".into()));
        }
        if version.is_empty() || version.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(invalid(format!("invalid marker version '{version}'")));
        }

        let mut collected: Vec<BlockMarker> = Vec::new();
        for (name, id, default_content) in markers {
            if collected.iter().any(|m| m.id == id || m.name == name) {
                return Err(invalid(format!("marker '{name}' ({id}) declared twice")));
            }
            collected.push(BlockMarker {
                name: name.to_string(),
                id,
                version: version.clone(),
                default_content: default_content.to_string(),
            });
        }

        let pattern = format!(
            r"^\s*{} {}(?P<uuid>{}):(?P<version>[^\s:]+)\s*$",
            regex::escape(&comment_prefix),
            regex::escape(MARKER_SENTINEL),
            UUID_V4_PATTERN,
        );
        let pattern = Regex::new(&pattern).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            family,
            comment_prefix,
            version,
            markers: collected,
            pattern,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn markers(&self) -> &[BlockMarker] {
        &self.markers
    }

    pub fn marker(&self, id: Uuid) -> Option<&BlockMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// The exact marker line (without indentation or newline) for `id`.
    pub fn tag(&self, id: Uuid) -> String {
        format!(
            "{} {}{}:{}",
            self.comment_prefix, MARKER_SENTINEL, id, self.version
        )
    }

    /// Match a single line (a trailing newline is allowed).
    pub fn match_line<'t>(&self, line: &'t str) -> Option<MarkerLine<'t>> {
        let caps = self.pattern.captures(line)?;
        let id = Uuid::parse_str(caps.name("uuid")?.as_str()).ok()?;
        let version = caps.name("version")?.as_str();
        Some(MarkerLine { id, version })
    }

    /// Tag and default content for every marker, keyed by block name.
    pub fn template_slots(&self) -> BTreeMap<String, BlockSlot> {
        self.markers
            .iter()
            .map(|m| {
                (
                    m.name.clone(),
                    BlockSlot {
                        tag: self.tag(m.id),
                        content: m.default_content.clone(),
                    },
                )
            })
            .collect()
    }
}
