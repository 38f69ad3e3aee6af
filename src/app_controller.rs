use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::coordinator::{BatchObserver, BatchSummary, JobCoordinator};
use crate::file_utils::FileManager;
use crate::injector::is_no_insertion;
use crate::job::{JobDescriptor, JobResult};
use crate::variant::TieredConverter;

// @module: Application controller for batch conversion

/// Main application controller for subtitle conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared conversion tiers
    converter: Arc<TieredConverter>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let converter = Arc::new(TieredConverter::from_config(&config.variant));
        Ok(Self { config, converter })
    }

    // @method: Create a controller with explicit conversion tiers
    pub fn with_converter(config: Config, converter: Arc<TieredConverter>) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config, converter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One descriptor per source file, all sharing the configured options
    pub fn build_descriptors(&self, files: &[PathBuf], insertion_names: &[String]) -> Result<Vec<JobDescriptor>> {
        let output_dir = self.config.output_dir();
        if let Some(dir) = &output_dir {
            FileManager::ensure_dir(dir)?;
        }

        for name in insertion_names.iter().filter(|n| !is_no_insertion(n)) {
            if !self.config.subtitle_configs.iter().any(|c| &c.name == name) {
                warn!("No subtitle config named '{}'; it will be skipped", name);
            }
        }

        let mut descriptors = Vec::with_capacity(files.len());
        let mut destinations = std::collections::HashSet::new();
        for source in files {
            let dest_path = FileManager::output_path_for(source, output_dir.as_deref());
            if !destinations.insert(dest_path.clone()) {
                return Err(anyhow!(
                    "Several inputs would be written to {:?}; rename them or convert them separately",
                    dest_path
                ));
            }

            descriptors.push(JobDescriptor {
                source_path: source.clone(),
                dest_path,
                insertion_names: insertion_names.to_vec(),
                subtitle_configs: self.config.subtitle_configs.clone(),
                subtitle_color: self.config.subtitle_color.clone(),
                outline_color: self.config.outline_color.clone(),
                delete_original_on_success: self.config.delete_original,
                convert_variant: self.config.convert_variant,
                font_family: self.config.font_family.clone(),
                font_size: self.config.font_size,
                remote_priority: self.config.remote_priority,
            });
        }

        Ok(descriptors)
    }

    /// Convert every input (file or directory) and wait for the batch
    pub async fn run(&self, inputs: &[PathBuf], insertion_names: &[String]) -> Result<BatchSummary> {
        let files = FileManager::collect_inputs(inputs)?;
        if files.is_empty() {
            warn!("No subtitle files found");
            return Ok(BatchSummary::default());
        }
        info!("Found {} subtitle files", files.len());

        let descriptors = self.build_descriptors(&files, insertion_names)?;
        let coordinator = JobCoordinator::with_pool_size(self.converter.clone(), self.config.max_concurrent_jobs);

        let observer = Arc::new(ProgressObserver::new(descriptors.len()));
        let summary = coordinator.submit(descriptors, observer).wait().await;

        self.report(&summary);
        Ok(summary)
    }

    fn report(&self, summary: &BatchSummary) {
        for result in summary.failed_results() {
            error!("{}: {}", display_name(&result.source_path), result.message);
        }
        if summary.degraded > 0 {
            warn!(
                "{} files kept some original text after script variant conversion failed",
                summary.degraded
            );
        }

        info!("Converted {}/{} files", summary.successes, summary.total);
        if let Some(dir) = self.config.output_dir() {
            info!("Output directory: {}", dir.display());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Drives a progress bar from batch callbacks
pub struct ProgressObserver {
    progress_bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(total: usize) -> Self {
        let progress_bar = ProgressBar::new(total as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        Self { progress_bar }
    }
}

impl BatchObserver for ProgressObserver {
    fn on_job_finished(&self, result: &JobResult, completed: usize, total: usize) {
        debug!("{}/{} finished: {}", completed, total, result.message);
        self.progress_bar.set_message(display_name(&result.source_path));
        self.progress_bar.set_position(completed as u64);
    }

    fn on_batch_complete(&self, summary: &BatchSummary) {
        self.progress_bar
            .finish_with_message(format!("{} succeeded, {} failed", summary.successes, summary.failures));
    }
}
