/*!
 * # subass - batch subtitle to ASS conversion
 *
 * A Rust library that converts SRT, WebVTT and ASS subtitle files into styled
 * ASS output.
 *
 * ## Features
 *
 * - Load SRT/VTT/ASS files and write ASS with a configurable Default style
 * - Traditional to simplified Chinese conversion through:
 *   - an online conversion service, reached directly or through proxies
 *   - an offline conversion table
 * - Injection of named, pre-configured caption blocks
 * - Concurrent batch conversion with per-file results
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle`: Document model, format readers and the ASS writer
 * - `variant`: Script variant conversion tiers and their fallback policy
 * - `injector`: Supplemental caption injection
 * - `job`: The per-file conversion pipeline
 * - `coordinator`: Bounded worker pool and batch completion tracking
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod coordinator;
pub mod errors;
pub mod file_utils;
pub mod injector;
pub mod job;
pub mod subtitle;
pub mod variant;

// Re-export main types for easier usage
pub use app_config::{Config, SubtitleConfig};
pub use coordinator::{Batch, BatchObserver, BatchSummary, JobCoordinator};
pub use errors::{InjectionError, JobError, LoadError, SaveError, TransportError, VariantError};
pub use job::{JobDescriptor, JobResult, JobStatus, run_job};
pub use subtitle::{Event, SubtitleDocument, SubtitleFormat};
pub use variant::{TieredConverter, VariantConverter};
