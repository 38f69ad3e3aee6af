/*!
 * One file's conversion pipeline.
 *
 * `Load -> Style -> Variant (optional) -> Inject -> Save -> Cleanup (optional) -> Done`.
 * Load, Inject and Save failures end the job with an error result; variant
 * conversion only degrades the result and cleanup failures are only logged.
 */

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::SubtitleConfig;
use crate::errors::{CleanupError, JobError};
use crate::injector;
use crate::subtitle::{self, StyleParams, SubtitleDocument};
use crate::variant::{TieredConverter, convert_events};

/// Suffix of the success message when variant conversion fell back to the original text
pub const DEGRADED_NOTE: &str = " (script variant conversion failed, original text kept)";

/// Immutable input of one conversion job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
    /// Names of the caption blocks to inject, in order
    #[serde(default)]
    pub insertion_names: Vec<String>,
    #[serde(default)]
    pub subtitle_configs: Vec<SubtitleConfig>,
    pub subtitle_color: String,
    pub outline_color: String,
    #[serde(default)]
    pub delete_original_on_success: bool,
    #[serde(default)]
    pub convert_variant: bool,
    pub font_family: String,
    pub font_size: f32,
    /// Try the remote tier before the local one
    #[serde(default)]
    pub remote_priority: bool,
}

impl JobDescriptor {
    fn style_params(&self) -> StyleParams {
        StyleParams {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            primary_color: self.subtitle_color.clone(),
            outline_color: self.outline_color.clone(),
        }
    }

    fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }
}

/// Terminal status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Success,
    Error,
}

/// The one report every job produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub status: JobStatus,
    pub message: String,
    /// Written file, present only on success
    pub output_path: Option<PathBuf>,
    pub source_path: PathBuf,
    /// Variant conversion kept some original text
    pub degraded: bool,
}

impl JobResult {
    pub fn success(source_path: PathBuf, output_path: PathBuf, degraded: bool) -> Self {
        let mut message = format!("Saved to: {}", output_path.display());
        if degraded {
            message.push_str(DEGRADED_NOTE);
        }
        Self {
            status: JobStatus::Success,
            message,
            output_path: Some(output_path),
            source_path,
            degraded,
        }
    }

    pub fn error(source_path: PathBuf, error: &JobError) -> Self {
        Self {
            status: JobStatus::Error,
            message: error.to_string(),
            output_path: None,
            source_path,
            degraded: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Success
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Load,
    Style,
    Variant,
    Inject,
    Save,
    Cleanup,
    Done,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Style => "style",
            Self::Variant => "variant",
            Self::Inject => "inject",
            Self::Save => "save",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// A single conversion job bound to its descriptor
#[derive(Debug)]
pub struct ConversionJob {
    descriptor: JobDescriptor,
    converter: Arc<TieredConverter>,
    stage: JobStage,
}

impl ConversionJob {
    pub fn new(descriptor: JobDescriptor, converter: Arc<TieredConverter>) -> Self {
        Self {
            descriptor,
            converter,
            stage: JobStage::Load,
        }
    }

    /// Run every stage and produce the job's single result
    pub async fn run(mut self) -> JobResult {
        let source = self.descriptor.source_path.clone();
        match self.execute().await {
            Ok((output, degraded)) => {
                info!("Converted {} -> {}", source.display(), output.display());
                JobResult::success(source, output, degraded)
            }
            Err(e) => {
                error!("Conversion of {} failed during {}: {}", source.display(), self.stage, e);
                JobResult::error(source, &e)
            }
        }
    }

    fn enter(&mut self, stage: JobStage) {
        debug!("{}: {} -> {}", self.descriptor.file_name(), self.stage, stage);
        self.stage = stage;
    }

    async fn execute(&mut self) -> Result<(PathBuf, bool), JobError> {
        let mut doc: SubtitleDocument = subtitle::load(&self.descriptor.source_path)?;

        self.enter(JobStage::Style);
        subtitle::apply_style(&mut doc, &self.descriptor.style_params());

        let mut degraded = false;
        if self.descriptor.convert_variant {
            self.enter(JobStage::Variant);
            let outcome = convert_events(&self.converter, &mut doc.events, self.descriptor.remote_priority).await;
            if outcome.degraded {
                warn!("{}: script variant conversion degraded", self.descriptor.file_name());
            }
            degraded = outcome.degraded;
        }

        self.enter(JobStage::Inject);
        injector::inject(&mut doc, &self.descriptor.insertion_names, &self.descriptor.subtitle_configs)?;

        self.enter(JobStage::Save);
        subtitle::save(&doc, &self.descriptor.dest_path)?;

        if self.descriptor.delete_original_on_success {
            self.enter(JobStage::Cleanup);
            if let Err(e) = remove_source(&self.descriptor.source_path, &self.descriptor.dest_path) {
                warn!("{}", e);
            }
        }

        self.enter(JobStage::Done);
        Ok((self.descriptor.dest_path.clone(), degraded))
    }
}

/// Delete the source after a successful save, unless it is the output itself
fn remove_source(source: &Path, dest: &Path) -> Result<(), CleanupError> {
    if same_file(source, dest) {
        warn!("Not deleting {}: it is the output file", source.display());
        return Ok(());
    }
    std::fs::remove_file(source).map_err(|e| CleanupError {
        path: source.to_path_buf(),
        source: e,
    })?;
    debug!("Removed source {}", source.display());
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Run one job to completion
pub async fn run_job(descriptor: JobDescriptor, converter: Arc<TieredConverter>) -> JobResult {
    ConversionJob::new(descriptor, converter).run().await
}
