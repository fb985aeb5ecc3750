use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::archive::ArchiveClient;
use crate::domain::{VariableList, VariableName};
use crate::error::GrabError;
use crate::layout;
use crate::template::{PathTemplate, TemplateValues};

/// Everything needed to name and place one run's variables.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub values: TemplateValues,
    pub variables: VariableList,
    pub template: PathTemplate,
    pub output_directory: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub verify_first: bool,
    pub clobber: bool,
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verify_first: true,
            clobber: true,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedExtraction {
    pub variable: VariableName,
    pub archive_path: String,
    pub target_directory: Utf8PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionAction {
    Extracted,
    Skipped,
    Planned,
}

impl ExtractionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionAction::Extracted => "extracted",
            ExtractionAction::Skipped => "skipped",
            ExtractionAction::Planned => "planned",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionItem {
    pub variable: String,
    pub archive_path: String,
    pub target_directory: String,
    pub action: ExtractionAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub started_at: String,
    pub verified: bool,
    pub items: Vec<ExtractionItem>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Resolves every archive path and its target directory.
///
/// Fails on the first variable whose directory cannot be derived, so layout
/// problems surface before the archive is touched.
pub fn plan(request: &ExtractionRequest) -> Result<Vec<PlannedExtraction>, GrabError> {
    request
        .template
        .resolve_all(&request.values, &request.variables)
        .into_iter()
        .map(|resolved| {
            let target_directory = layout::target_directory(
                &resolved.path,
                &request.values.institution,
                request.output_directory.as_deref(),
            )?;
            Ok(PlannedExtraction {
                variable: resolved.variable,
                archive_path: resolved.path,
                target_directory,
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct App<A: ArchiveClient> {
    archive: A,
}

impl<A: ArchiveClient> App<A> {
    pub fn new(archive: A) -> Self {
        Self { archive }
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn run(
        &self,
        request: &ExtractionRequest,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunResult, GrabError> {
        let started_at = chrono::Utc::now().to_rfc3339();
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; template {}", request.template),
            elapsed: None,
        });
        let planned = plan(request)?;
        for item in &planned {
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Resolve; {} -> {} (into {})",
                    item.variable, item.archive_path, item.target_directory
                ),
                elapsed: None,
            });
        }

        if options.dry_run {
            return Ok(RunResult {
                started_at,
                verified: false,
                items: planned
                    .iter()
                    .map(|item| to_item(item, ExtractionAction::Planned))
                    .collect(),
            });
        }

        if options.verify_first {
            self.verify(&planned, sink)?;
        }

        let mut items = Vec::with_capacity(planned.len());
        for item in &planned {
            let action = self.extract(item, options.clobber, sink)?;
            items.push(to_item(item, action));
        }

        Ok(RunResult {
            started_at,
            verified: options.verify_first,
            items,
        })
    }

    /// Checks every path in order and stops at the first one missing.
    pub fn verify(
        &self,
        planned: &[PlannedExtraction],
        sink: &dyn ProgressSink,
    ) -> Result<(), GrabError> {
        sink.event(ProgressEvent {
            message: "phase=Verify; checking that expected tar files exist on tape".to_string(),
            elapsed: None,
        });
        for item in planned {
            let started = Instant::now();
            self.archive.list(&item.archive_path)?;
            sink.event(ProgressEvent {
                message: format!("phase=Verify; found {}", item.archive_path),
                elapsed: Some(started.elapsed()),
            });
        }
        Ok(())
    }

    pub fn extract(
        &self,
        item: &PlannedExtraction,
        clobber: bool,
        sink: &dyn ProgressSink,
    ) -> Result<ExtractionAction, GrabError> {
        if !clobber && layout::is_populated(&item.target_directory)? {
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Extract; files exist in {} and clobbering is off; skipping {}",
                    item.target_directory, item.variable
                ),
                elapsed: None,
            });
            return Ok(ExtractionAction::Skipped);
        }

        layout::ensure_directory(&item.target_directory)?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Extract; extracting {} from {}; this may take some time",
                item.variable, item.archive_path
            ),
            elapsed: None,
        });
        let started = Instant::now();
        self.archive
            .extract(&item.variable, &item.archive_path, &item.target_directory)?;
        sink.event(ProgressEvent {
            message: format!("phase=Extract; {} done", item.variable),
            elapsed: Some(started.elapsed()),
        });
        Ok(ExtractionAction::Extracted)
    }
}

fn to_item(item: &PlannedExtraction, action: ExtractionAction) -> ExtractionItem {
    ExtractionItem {
        variable: item.variable.to_string(),
        archive_path: item.archive_path.clone(),
        target_directory: item.target_directory.to_string(),
        action,
    }
}
