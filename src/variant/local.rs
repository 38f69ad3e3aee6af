use async_trait::async_trait;
use zhconv::{Variant, zhconv};

use crate::errors::VariantError;

use super::VariantConverter;

/// Offline tier backed by the bundled traditional-to-simplified tables
#[derive(Debug, Clone)]
pub struct LocalConverter {
    enabled: bool,
}

impl LocalConverter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for LocalConverter {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl VariantConverter for LocalConverter {
    fn name(&self) -> &str {
        "local"
    }

    async fn convert(&self, text: &str) -> Result<String, VariantError> {
        if !self.enabled {
            return Err(VariantError::Unavailable("local (disabled in configuration)".to_string()));
        }

        // Table lookups are CPU-bound; a panicking lookup surfaces as a JoinError
        let owned = text.to_string();
        tokio::task::spawn_blocking(move || zhconv(&owned, Variant::ZhHans))
            .await
            .map_err(|e| VariantError::ConversionFailed(e.to_string()))
    }
}
