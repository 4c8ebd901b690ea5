//! Regeneration: write policies, block merging, dry-run diffs.
//!
//! A run is planned completely before anything is written, so a policy
//! violation or merge ambiguity on any artifact leaves the tree untouched.
//! Writes are not transactional; a failing write aborts the run and the
//! error lists what was written before it.

use serde::Serialize;
use similar::TextDiff;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::layout::ProjectLayout;
use crate::application::ports::Filesystem;
use crate::domain::{BlockPreservingMerger, DomainError, GeneratedArtifact, WritePolicy};
use crate::error::{StencilError, StencilResult};

/// What happened (or would happen) to one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ArtifactAction {
    Created,
    Updated,
    Overwritten,
    Unchanged,
    Skipped { reason: String },
    /// Dry run: the unified diff the write would produce.
    Diff { diff: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub label: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub action: ArtifactAction,
}

/// An interface, namespace or module skipped by a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub name: String,
    pub reason: String,
}

/// Result of a regeneration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub artifacts: Vec<ArtifactReport>,
    pub skipped: Vec<SkippedItem>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn written(&self) -> impl Iterator<Item = &ArtifactReport> {
        self.artifacts.iter().filter(|a| {
            matches!(
                a.action,
                ArtifactAction::Created | ArtifactAction::Updated | ArtifactAction::Overwritten
            )
        })
    }
}

/// A decided write, not yet performed.
struct PlannedWrite {
    path: PathBuf,
    content: String,
}

/// Applies write policies and merges, then writes (or diffs) artifacts.
pub struct RegenerationOrchestrator<'a> {
    filesystem: &'a dyn Filesystem,
    layout: &'a ProjectLayout,
    dry_run: bool,
}

impl<'a> RegenerationOrchestrator<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, layout: &'a ProjectLayout, dry_run: bool) -> Self {
        Self {
            filesystem,
            layout,
            dry_run,
        }
    }

    #[instrument(skip_all, fields(artifacts = artifacts.len(), dry_run = self.dry_run))]
    pub fn run(&self, artifacts: Vec<GeneratedArtifact>) -> StencilResult<RunReport> {
        let mut report = RunReport::default();
        let mut writes = Vec::new();

        for artifact in artifacts {
            let (action, write) = self.plan(&artifact, &mut report.warnings)?;
            debug!(label = %artifact.label, ?action, "Planned");
            if let Some(write) = write {
                writes.push(write);
            }
            report.artifacts.push(ArtifactReport {
                label: artifact.label,
                path: artifact.path,
                action,
            });
        }

        if !self.dry_run {
            self.write_all(writes)?;
        }

        for entry in &report.artifacts {
            info!(path = %self.layout.display(&entry.path), action = ?entry.action, "Artifact");
        }
        Ok(report)
    }

    fn plan(
        &self,
        artifact: &GeneratedArtifact,
        warnings: &mut Vec<String>,
    ) -> StencilResult<(ArtifactAction, Option<PlannedWrite>)> {
        let path = &artifact.path;
        let existing = if self.filesystem.exists(path) {
            Some(self.filesystem.read_to_string(path)?)
        } else {
            None
        };
        let policy = artifact.write_policy;

        let keep_blocks = match (policy, &existing) {
            (WritePolicy::Create, Some(_)) => {
                return Err(self.violation(path, policy, "the file already exists"));
            }
            (WritePolicy::UpdateIfNonExistent, Some(_)) => {
                return Ok((skipped("exists and is maintained by hand"), None));
            }
            (WritePolicy::Update, None) if artifact.kind.requires_prior_scaffolding() => {
                return Err(self.violation(
                    path,
                    policy,
                    "the file does not exist; create the module first",
                ));
            }
            (WritePolicy::Update, Some(_)) if self.is_up_to_date(artifact)? => {
                return Ok((skipped("up to date"), None));
            }
            (WritePolicy::Update | WritePolicy::ForceUpdate, _) => true,
            _ => false,
        };

        let content = match artifact.kind.block_schema() {
            Some(schema) => {
                let prior = if keep_blocks { existing.as_deref() } else { None };
                let outcome = BlockPreservingMerger::new(schema)
                    .merge(prior, &artifact.rendered_content)
                    .map_err(|e| self.failed(path, e.into()))?;

                // Only the force policies may drop code the user wrote.
                if let (WritePolicy::Update, Some(orphan)) = (policy, outcome.orphaned.first()) {
                    let orphaned = DomainError::OrphanedBlock {
                        marker: orphan.marker_id.to_string(),
                        line: orphan.line,
                    };
                    return Err(self.failed(path, orphaned.into()));
                }

                let shown = self.layout.display(path);
                for orphan in &outcome.orphaned {
                    warnings.push(format!(
                        "{shown}: custom block {} (line {}) has no place in the new output and was dropped",
                        orphan.marker_id, orphan.line
                    ));
                }
                for mismatch in &outcome.version_mismatches {
                    warnings.push(format!(
                        "{shown}: block {} on line {} has version {}, expected {}",
                        mismatch.marker_id, mismatch.line, mismatch.found, mismatch.expected
                    ));
                }
                outcome.content
            }
            None => artifact.rendered_content.clone(),
        };

        if existing.as_deref() == Some(content.as_str()) {
            return Ok((ArtifactAction::Unchanged, None));
        }

        let action = if self.dry_run {
            ArtifactAction::Diff {
                diff: self.diff(path, existing.as_deref().unwrap_or_default(), &content),
            }
        } else {
            match (&existing, policy) {
                (None, _) => ArtifactAction::Created,
                (Some(_), WritePolicy::ForceCreate) => ArtifactAction::Overwritten,
                (Some(_), _) => ArtifactAction::Updated,
            }
        };

        Ok((
            action,
            Some(PlannedWrite {
                path: path.clone(),
                content,
            }),
        ))
    }

    /// Whether the target is newer than every source it was generated from.
    fn is_up_to_date(&self, artifact: &GeneratedArtifact) -> StencilResult<bool> {
        let Some(sources) = artifact.sources_modified else {
            return Ok(false);
        };
        Ok(self.filesystem.modification_time(&artifact.path)? > sources)
    }

    fn write_all(&self, writes: Vec<PlannedWrite>) -> StencilResult<()> {
        let mut written = Vec::with_capacity(writes.len());
        for write in writes {
            if let Err(cause) = self.write(&write) {
                warn!(path = %write.path.display(), written = written.len(), "Write failed, aborting run");
                return Err(ApplicationError::RunAborted {
                    written,
                    cause: Box::new(cause),
                }
                .into());
            }
            written.push(write.path);
        }
        Ok(())
    }

    fn write(&self, write: &PlannedWrite) -> StencilResult<()> {
        if let Some(parent) = write.path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(&write.path, &write.content)
    }

    fn diff(&self, path: &Path, old: &str, new: &str) -> String {
        let shown = self.layout.display(path).to_string();
        TextDiff::from_lines(old, new)
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{shown}"), &format!("b/{shown}"))
            .to_string()
    }

    fn violation(&self, path: &Path, policy: WritePolicy, reason: &str) -> StencilError {
        ApplicationError::WritePolicyViolation {
            path: path.to_path_buf(),
            policy,
            reason: reason.to_string(),
        }
        .into()
    }

    fn failed(&self, path: &Path, cause: StencilError) -> StencilError {
        ApplicationError::ArtifactFailed {
            subject: self.layout.display(path).to_string(),
            cause: Box::new(cause),
        }
        .into()
    }
}

fn skipped(reason: &str) -> ArtifactAction {
    ArtifactAction::Skipped {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::domain::{ArtifactKind, blocks};
    use crate::testing::FakeFilesystem;
    use std::time::{Duration, UNIX_EPOCH};

    const HEADER: &str = "/ws/modules/A/A.hpp";

    fn header_skeleton(body: &str) -> String {
        let schema = blocks::module_header();
        let slots = schema.template_slots();
        let mut out = format!("#pragma once\n{body}");
        for slot in slots.values() {
            out.push_str(&format!("{}\n{}{}\n", slot.tag, slot.content, slot.tag));
        }
        out
    }

    fn artifact(kind: ArtifactKind, path: &str, content: &str, policy: WritePolicy) -> GeneratedArtifact {
        GeneratedArtifact {
            label: kind.template_name().to_string(),
            kind,
            path: PathBuf::from(path),
            rendered_content: content.to_string(),
            write_policy: policy,
            sources_modified: None,
        }
    }

    fn run(fs: &dyn Filesystem, dry_run: bool, artifacts: Vec<GeneratedArtifact>) -> StencilResult<RunReport> {
        let layout = ProjectLayout::new("/ws");
        RegenerationOrchestrator::new(fs, &layout, dry_run).run(artifacts)
    }

    #[test]
    fn create_writes_missing_files() {
        let fs = FakeFilesystem::new();
        let report = run(
            &fs,
            false,
            vec![artifact(ArtifactKind::ModuleHeader, HEADER, &header_skeleton(""), WritePolicy::Create)],
        )
        .unwrap();

        assert_eq!(report.artifacts[0].action, ArtifactAction::Created);
        assert_eq!(fs.content(HEADER).unwrap(), header_skeleton(""));
    }

    #[test]
    fn create_refuses_existing_and_writes_nothing() {
        let fs = FakeFilesystem::new().with_file(HEADER, "old");
        let err = run(
            &fs,
            false,
            vec![
                artifact(ArtifactKind::BindingsHeader, "/ws/modules/A/bindings.hpp", "b", WritePolicy::Create),
                artifact(ArtifactKind::ModuleHeader, HEADER, "new", WritePolicy::Create),
            ],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::WritePolicyViolation { policy: WritePolicy::Create, .. })
        ));
        assert_eq!(fs.content(HEADER).unwrap(), "old");
        assert!(fs.content("/ws/modules/A/bindings.hpp").is_none());
    }

    #[test]
    fn force_create_discards_custom_blocks() {
        let edited = header_skeleton("").replace("// insert your public definitions here\n", "int x;\n");
        let fs = FakeFilesystem::new().with_file(HEADER, &edited);
        let report = run(
            &fs,
            false,
            vec![artifact(ArtifactKind::ModuleHeader, HEADER, &header_skeleton(""), WritePolicy::ForceCreate)],
        )
        .unwrap();

        assert_eq!(report.artifacts[0].action, ArtifactAction::Overwritten);
        assert_eq!(fs.content(HEADER).unwrap(), header_skeleton(""));
    }

    #[test]
    fn update_merges_custom_blocks() {
        let edited = header_skeleton("").replace("// insert your public definitions here\n", "int x;\n");
        let fs = FakeFilesystem::new().with_file(HEADER, &edited);
        let report = run(
            &fs,
            false,
            vec![artifact(ArtifactKind::ModuleHeader, HEADER, &header_skeleton("// v2\n"), WritePolicy::Update)],
        )
        .unwrap();

        assert_eq!(report.artifacts[0].action, ArtifactAction::Updated);
        let content = fs.content(HEADER).unwrap();
        assert!(content.contains("int x;\n"));
        assert!(content.contains("// v2\n"));
    }

    #[test]
    fn update_requires_prior_scaffolding() {
        let fs = FakeFilesystem::new();
        let err = run(
            &fs,
            false,
            vec![artifact(ArtifactKind::ModuleHeader, HEADER, "x", WritePolicy::Update)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::WritePolicyViolation { policy: WritePolicy::Update, .. })
        ));
    }

    #[test]
    fn update_creates_glue_files() {
        let fs = FakeFilesystem::new();
        let report = run(
            &fs,
            false,
            vec![artifact(ArtifactKind::BindingsHeader, "/ws/modules/A/bindings.hpp", "glue", WritePolicy::Update)],
        )
        .unwrap();
        assert_eq!(report.artifacts[0].action, ArtifactAction::Created);
    }

    #[test]
    fn update_skips_targets_newer_than_sources() {
        let fs = FakeFilesystem::new().with_file(HEADER, "current");
        let mut newer = artifact(ArtifactKind::ModuleHeader, HEADER, "regenerated", WritePolicy::Update);
        newer.sources_modified = Some(UNIX_EPOCH);

        let report = run(&fs, false, vec![newer.clone()]).unwrap();
        assert!(matches!(report.artifacts[0].action, ArtifactAction::Skipped { .. }));
        assert_eq!(fs.content(HEADER).unwrap(), "current");

        newer.write_policy = WritePolicy::ForceUpdate;
        let report = run(&fs, false, vec![newer]).unwrap();
        assert_eq!(report.artifacts[0].action, ArtifactAction::Updated);
    }

    #[test]
    fn update_with_stale_target_regenerates() {
        let fs = FakeFilesystem::new().with_file(HEADER, "current");
        let mut stale = artifact(ArtifactKind::ModuleHeader, HEADER, "regenerated", WritePolicy::Update);
        stale.sources_modified = Some(UNIX_EPOCH + Duration::from_secs(1_000));

        let report = run(&fs, false, vec![stale]).unwrap();
        assert_eq!(report.artifacts[0].action, ArtifactAction::Updated);
        assert_eq!(fs.content(HEADER).unwrap(), "regenerated");
    }

    #[test]
    fn update_if_non_existent_keeps_sources() {
        let fs = FakeFilesystem::new().with_file("/ws/modules/A/A.cpp", "mine");
        let report = run(
            &fs,
            false,
            vec![
                artifact(ArtifactKind::ModuleSource, "/ws/modules/A/A.cpp", "gen", WritePolicy::UpdateIfNonExistent),
                artifact(ArtifactKind::ImplSource, "/ws/modules/A/main/xImpl.cpp", "gen", WritePolicy::UpdateIfNonExistent),
            ],
        )
        .unwrap();

        assert!(matches!(report.artifacts[0].action, ArtifactAction::Skipped { .. }));
        assert_eq!(report.artifacts[1].action, ArtifactAction::Created);
        assert_eq!(fs.content("/ws/modules/A/A.cpp").unwrap(), "mine");
    }

    #[test]
    fn identical_output_is_not_rewritten() {
        let fs = FakeFilesystem::new().with_file(HEADER, &header_skeleton(""));
        let before = fs.modification_time(Path::new(HEADER)).unwrap();
        let report = run(
            &fs,
            false,
            vec![artifact(ArtifactKind::ModuleHeader, HEADER, &header_skeleton(""), WritePolicy::ForceUpdate)],
        )
        .unwrap();

        assert_eq!(report.artifacts[0].action, ArtifactAction::Unchanged);
        assert_eq!(fs.modification_time(Path::new(HEADER)).unwrap(), before);
    }

    #[test]
    fn dry_run_reports_diff_and_writes_nothing() {
        let fs = FakeFilesystem::new().with_file("/ws/modules/A/bindings.hpp", "a\nb\n");
        let report = run(
            &fs,
            true,
            vec![artifact(ArtifactKind::BindingsHeader, "/ws/modules/A/bindings.hpp", "a\nc\n", WritePolicy::ForceUpdate)],
        )
        .unwrap();

        let ArtifactAction::Diff { diff } = &report.artifacts[0].action else {
            panic!("expected a diff, got {:?}", report.artifacts[0].action);
        };
        assert!(diff.contains("--- a/modules/A/bindings.hpp"));
        assert!(diff.contains("-b\n"));
        assert!(diff.contains("+c\n"));
        assert_eq!(fs.content("/ws/modules/A/bindings.hpp").unwrap(), "a\nb\n");
    }

    #[test]
    fn ambiguous_existing_file_fails_with_context() {
        let schema = blocks::module_header();
        let tag = schema.tag(schema.markers()[0].id);
        let fs = FakeFilesystem::new().with_file(HEADER, &format!("{tag}\nunclosed\n"));

        let err = run(
            &fs,
            false,
            vec![artifact(ArtifactKind::ModuleHeader, HEADER, &header_skeleton(""), WritePolicy::Update)],
        )
        .unwrap_err();

        assert!(err.to_string().contains("modules/A/A.hpp"));
        assert!(matches!(
            err.root_cause(),
            StencilError::Domain(DomainError::MergeAmbiguity { line: 1, .. })
        ));
    }

    #[test]
    fn orphaned_blocks_become_warnings() {
        let schema = blocks::module_header();
        let slots = schema.template_slots();
        let edited = header_skeleton("");
        let public = &slots["public_defs"];
        let without_public = header_skeleton("").replace(
            &format!("{}\n{}{}\n", public.tag, public.content, public.tag),
            "",
        );

        let fs = FakeFilesystem::new().with_file(HEADER, &edited);
        let report = run(
            &fs,
            false,
            vec![artifact(ArtifactKind::ModuleHeader, HEADER, &without_public, WritePolicy::ForceUpdate)],
        )
        .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("has no place"));
    }

    #[test]
    fn update_refuses_to_drop_orphaned_blocks() {
        let stray = uuid::Uuid::from_u128(0x11111111_2222_4333_8444_555555555555);
        let tag = format!("// stencil@{stray}:v1");
        let edited = format!("{}{tag}\nint my_code;\n{tag}\n", header_skeleton(""));
        let fs = FakeFilesystem::new()
            .with_file(HEADER, &edited)
            .with_file("/ws/modules/A/bindings.hpp", "old glue");

        let err = run(
            &fs,
            false,
            vec![
                artifact(ArtifactKind::BindingsHeader, "/ws/modules/A/bindings.hpp", "new glue", WritePolicy::Update),
                artifact(ArtifactKind::ModuleHeader, HEADER, &header_skeleton("// v2\n"), WritePolicy::Update),
            ],
        )
        .unwrap_err();

        assert!(err.to_string().contains("modules/A/A.hpp"));
        let StencilError::Domain(DomainError::OrphanedBlock { marker, line }) = err.root_cause() else {
            panic!("expected an orphaned block, got {err:?}");
        };
        assert_eq!(marker, &stray.to_string());
        assert_eq!(*line, header_skeleton("").lines().count() + 1);
        assert_eq!(fs.content(HEADER).unwrap(), edited);
        assert_eq!(fs.content("/ws/modules/A/bindings.hpp").unwrap(), "old glue");
    }

    #[test]
    fn failed_write_reports_what_was_written() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|path, _| {
            if path.ends_with("second.hpp") {
                Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "disk full".into(),
                }
                .into())
            } else {
                Ok(())
            }
        });

        let err = run(
            &fs,
            false,
            vec![
                artifact(ArtifactKind::BindingsHeader, "/ws/first.hpp", "1", WritePolicy::Create),
                artifact(ArtifactKind::BindingsHeader, "/ws/second.hpp", "2", WritePolicy::Create),
                artifact(ArtifactKind::BindingsHeader, "/ws/third.hpp", "3", WritePolicy::Create),
            ],
        )
        .unwrap_err();

        assert_eq!(err.written_before_failure(), [PathBuf::from("/ws/first.hpp")]);
    }
}
