/*!
 * Script variant (traditional to simplified Chinese) conversion.
 *
 * This module contains the two conversion tiers and the policy that chains them:
 * - `remote`: the online conversion service, tried over several network transports
 * - `local`: the offline conversion table
 * - `batch`: whole-document conversion with a per-event fallback
 *
 * Both tiers implement `VariantConverter`; `TieredConverter` tries them in the
 * priority order chosen per job and never returns an error to its caller.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::VariantConfig;
use crate::errors::VariantError;

pub mod batch;
pub mod local;
pub mod remote;

pub use batch::{VariantOutcome, convert_events};
pub use local::LocalConverter;
pub use remote::{ConvertRequest, ConvertResponse, HttpTransport, RemoteConverter, ReqwestTransport, TransportConfig, TransportResponse};

/// Common trait for the conversion tiers
///
/// Implementations report failure through `VariantError`; the fallback
/// policy decides what happens next.
#[async_trait]
pub trait VariantConverter: Send + Sync + Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Convert `text` to simplified script
    async fn convert(&self, text: &str) -> Result<String, VariantError>;
}

/// Remote and local tiers tried in a caller-chosen order
#[derive(Debug, Clone)]
pub struct TieredConverter {
    remote: Arc<dyn VariantConverter>,
    local: Arc<dyn VariantConverter>,
}

impl TieredConverter {
    /// Create a converter from explicit tiers
    pub fn new(remote: Arc<dyn VariantConverter>, local: Arc<dyn VariantConverter>) -> Self {
        Self { remote, local }
    }

    /// Build the production tiers from configuration
    pub fn from_config(config: &VariantConfig) -> Self {
        Self::new(
            Arc::new(RemoteConverter::from_config(config)),
            Arc::new(LocalConverter::new(config.local_enabled)),
        )
    }

    /// Convert `text`, returning the converted text and whether any tier succeeded.
    ///
    /// With `remote_priority` the remote tier goes first, otherwise the local
    /// one. When both fail the original text comes back with `false`. Blank
    /// input is returned unchanged as a failure without calling either tier.
    pub async fn convert(&self, text: &str, remote_priority: bool) -> (String, bool) {
        if text.trim().is_empty() {
            return (text.to_string(), false);
        }

        let tiers = if remote_priority {
            [&self.remote, &self.local]
        } else {
            [&self.local, &self.remote]
        };

        for tier in tiers {
            match tier.convert(text).await {
                Ok(converted) => {
                    debug!("Variant conversion succeeded with {} tier", tier.name());
                    return (converted, true);
                }
                Err(e) => {
                    warn!("Variant conversion with {} tier failed: {}", tier.name(), e);
                }
            }
        }

        (text.to_string(), false)
    }
}
