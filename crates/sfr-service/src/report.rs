//! `check-artifacts` report

use serde::Serialize;
use sfr_artifact::{ArtifactKind, Fingerprint, ModelArtifactSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub artifact: ArtifactKind,
    pub required: bool,
    pub path: Option<PathBuf>,
    pub fingerprint: Option<Fingerprint>,
}

/// Load status of every artifact in one directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub artifact_dir: PathBuf,
    pub artifacts: Vec<ArtifactStatus>,
    pub missing_required: Vec<ArtifactKind>,
}

impl ArtifactReport {
    #[must_use]
    pub fn from_set(dir: &Path, set: &ModelArtifactSet) -> Self {
        let artifacts = ArtifactKind::ALL
            .into_iter()
            .map(|kind| {
                let status = set.status(kind);
                ArtifactStatus {
                    artifact: kind,
                    required: kind.is_required(),
                    path: status.map(|(path, _)| path.to_path_buf()),
                    fingerprint: status.map(|(_, fp)| fp),
                }
            })
            .collect();
        Self {
            artifact_dir: dir.to_path_buf(),
            artifacts,
            missing_required: set.missing_required(),
        }
    }

    /// Ready to serve `/predict`
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.missing_required.is_empty()
    }

    /// Plain-text rendering
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Artifact directory: {}", self.artifact_dir.display());
        let _ = writeln!(out);
        for row in &self.artifacts {
            let marker = if row.required { "*" } else { " " };
            match (&row.path, &row.fingerprint) {
                (Some(path), Some(fp)) => {
                    let _ = writeln!(
                        out,
                        "  ✓ {marker} {:<16} {}  [{}]",
                        row.artifact.name(),
                        path.display(),
                        fp.short()
                    );
                }
                _ => {
                    let _ = writeln!(out, "  ✗ {marker} {:<16} not found", row.artifact.name());
                }
            }
        }
        let _ = writeln!(out);
        if self.is_ready() {
            let _ = writeln!(out, "Status: READY");
        } else {
            let names: Vec<_> = self.missing_required.iter().map(|k| k.name()).collect();
            let _ = writeln!(out, "Status: MISSING REQUIRED ({})", names.join(", "));
        }
        out
    }
}
