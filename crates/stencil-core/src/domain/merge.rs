//! Block-preserving merge of regenerated files.
//!
//! The merger is pure: it sees the previous file content (if any), the
//! freshly rendered skeleton and the [`BlockSchema`] of the file family.
//! Text outside custom regions always comes from the skeleton; text inside
//! a region comes from the previous file when it had a region with the same
//! UUID. Captured content is copied byte for byte.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::domain::entities::block::{BlockSchema, CustomBlockInstance};
use crate::domain::error::DomainError;

/// Whether a previous file took part in the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// No previous file; the skeleton is used with default block content.
    Fresh,
    /// Custom regions of the previous file were carried over.
    Merged,
}

/// A region whose marker version differs from the schema's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMismatch {
    pub marker_id: Uuid,
    pub found: String,
    pub expected: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub content: String,
    pub state: MergeState,
    /// Markers whose captured content was substituted.
    pub preserved: Vec<Uuid>,
    /// Captured regions with no counterpart in the new skeleton.
    pub orphaned: Vec<CustomBlockInstance>,
    pub version_mismatches: Vec<VersionMismatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'t> {
    Text(&'t str),
    Region {
        id: Uuid,
        version: &'t str,
        line: usize,
        open: &'t str,
        content: &'t str,
        close: &'t str,
    },
}

struct OpenRegion<'t> {
    id: Uuid,
    version: &'t str,
    line: usize,
    start: usize,
    content_start: usize,
}

/// Merges regenerated content with the custom regions of a previous file.
#[derive(Debug, Clone, Copy)]
pub struct BlockPreservingMerger<'s> {
    schema: &'s BlockSchema,
}

impl<'s> BlockPreservingMerger<'s> {
    pub fn new(schema: &'s BlockSchema) -> Self {
        Self { schema }
    }

    /// All custom regions of `text`, in file order.
    pub fn extract(&self, text: &str) -> Result<Vec<CustomBlockInstance>, DomainError> {
        Ok(self
            .scan(text)?
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Region {
                    id,
                    version,
                    line,
                    content,
                    ..
                } => Some(CustomBlockInstance {
                    marker_id: id,
                    captured_content: content.to_string(),
                    version: version.to_string(),
                    line,
                }),
                Segment::Text(_) => None,
            })
            .collect())
    }

    /// Produce the final content for a file.
    pub fn merge(&self, existing: Option<&str>, skeleton: &str) -> Result<MergeOutcome, DomainError> {
        let skeleton_segments = self.scan(skeleton)?;

        let Some(existing) = existing else {
            return Ok(MergeOutcome {
                content: skeleton.to_string(),
                state: MergeState::Fresh,
                preserved: Vec::new(),
                orphaned: Vec::new(),
                version_mismatches: Vec::new(),
            });
        };

        let captured = self.extract(existing)?;
        let version_mismatches = captured
            .iter()
            .filter(|block| block.version != self.schema.version())
            .map(|block| VersionMismatch {
                marker_id: block.marker_id,
                found: block.version.clone(),
                expected: self.schema.version().to_string(),
                line: block.line,
            })
            .collect();

        let by_id: HashMap<Uuid, &CustomBlockInstance> =
            captured.iter().map(|block| (block.marker_id, block)).collect();

        let mut content = String::with_capacity(skeleton.len().max(existing.len()));
        let mut preserved = Vec::new();
        for segment in &skeleton_segments {
            match *segment {
                Segment::Text(text) => content.push_str(text),
                Segment::Region {
                    id,
                    open,
                    content: default,
                    close,
                    ..
                } => {
                    content.push_str(open);
                    match by_id.get(&id) {
                        Some(block) => {
                            content.push_str(&block.captured_content);
                            preserved.push(id);
                        }
                        None => content.push_str(default),
                    }
                    content.push_str(close);
                }
            }
        }

        let orphaned = captured
            .iter()
            .filter(|block| !preserved.contains(&block.marker_id))
            .cloned()
            .collect();

        Ok(MergeOutcome {
            content,
            state: MergeState::Merged,
            preserved,
            orphaned,
            version_mismatches,
        })
    }

    fn scan<'t>(&self, text: &'t str) -> Result<Vec<Segment<'t>>, DomainError> {
        let mut segments = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut open: Option<OpenRegion<'t>> = None;
        let mut text_start = 0;
        let mut offset = 0;

        for (index, line) in text.split_inclusive('\n').enumerate() {
            let line_no = index + 1;
            let start = offset;
            offset += line.len();

            let Some(marker) = self.schema.match_line(line) else {
                continue;
            };

            match open.take() {
                None => {
                    if !seen.insert(marker.id) {
                        return Err(DomainError::MergeAmbiguity {
                            line: line_no,
                            reason: format!("marker {} opens a second region", marker.id),
                        });
                    }
                    if start > text_start {
                        segments.push(Segment::Text(&text[text_start..start]));
                    }
                    open = Some(OpenRegion {
                        id: marker.id,
                        version: marker.version,
                        line: line_no,
                        start,
                        content_start: offset,
                    });
                }
                Some(region) if region.id == marker.id => {
                    segments.push(Segment::Region {
                        id: region.id,
                        version: region.version,
                        line: region.line,
                        open: &text[region.start..region.content_start],
                        content: &text[region.content_start..start],
                        close: &text[start..offset],
                    });
                    text_start = offset;
                }
                Some(region) => {
                    return Err(DomainError::MergeAmbiguity {
                        line: line_no,
                        reason: format!(
                            "marker {} appears inside the region of {} opened at line {}",
                            marker.id, region.id, region.line
                        ),
                    });
                }
            }
        }

        if let Some(region) = open {
            return Err(DomainError::MergeAmbiguity {
                line: region.line,
                reason: format!("marker {} is never closed", region.id),
            });
        }

        if text_start < text.len() {
            segments.push(Segment::Text(&text[text_start..]));
        }

        Ok(segments)
    }
}
