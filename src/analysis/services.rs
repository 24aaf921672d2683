use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{instrument, warn};

use super::parse::{parse_estimate, MealEstimate};
use super::vision::VisionClient;
use crate::error::AnalysisError;

/// Image → nutrition estimate. Stateless; one bounded vision call, no retry.
#[derive(Clone)]
pub struct AnalysisPipeline {
    vision: Arc<dyn VisionClient>,
    timeout: Duration,
}

impl AnalysisPipeline {
    pub fn new(vision: Arc<dyn VisionClient>, timeout: Duration) -> Self {
        Self { vision, timeout }
    }

    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn analyze(&self, image: Bytes) -> Result<MealEstimate, AnalysisError> {
        if image.is_empty() {
            return Err(AnalysisError::EmptyImage);
        }

        let raw = tokio::time::timeout(self.timeout, self.vision.describe(image))
            .await
            .map_err(|_| AnalysisError::Timeout(self.timeout.as_secs()))??;

        parse_estimate(&raw).map_err(|e| {
            let preview: String = raw.chars().take(120).collect();
            warn!(error = %e, reply = %preview, "vision reply rejected");
            e
        })
    }
}
