use std::fmt;

use super::render::build_render_model;
use crate::error::AnalysisError;
use crate::models::views::RenderModel;
use crate::services::{Analysis, VisionService};

const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_supported_image(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Identity of an upload: file name plus byte length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadId(String);

impl UploadId {
    pub fn new(filename: &str, byte_len: usize) -> Self {
        UploadId(format!("{}-{}", filename, byte_len))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State for one viewer: the image currently shown and what the model said
/// about it. A new upload replaces all of it.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    upload_id: Option<UploadId>,
    image_bytes: Option<Vec<u8>>,
    outcome: Option<Result<Analysis, AnalysisError>>,
}

impl AnalysisSession {
    pub fn upload_id(&self) -> Option<&UploadId> {
        self.upload_id.as_ref()
    }

    /// Returns `true` when the upload needs a fresh analysis. Only a
    /// successful outcome for the same name and size is reused; a failed one
    /// is retried on re-upload.
    pub fn register_upload(&mut self, filename: &str, bytes: Vec<u8>) -> bool {
        let id = UploadId::new(filename, bytes.len());
        if self.upload_id.as_ref() == Some(&id) {
            if let Some(Ok(_)) = self.outcome {
                log::debug!("♻️ Same upload {}, using cached result", id);
                return false;
            }
            log::info!("🔁 Re-upload of {} after a failed analysis, trying again", id);
        } else {
            log::info!("🖼️ New upload: {}", id);
        }

        self.upload_id = Some(id);
        self.image_bytes = Some(bytes);
        self.outcome = None;
        true
    }

    /// Run the model on the current image and store the outcome. The image
    /// bytes are released once the outcome is stored.
    pub async fn analyze(&mut self, service: &dyn VisionService) -> &Result<Analysis, AnalysisError> {
        let outcome = match self.image_bytes.take() {
            Some(bytes) if !bytes.is_empty() => service.analyze_food_image(&bytes).await,
            _ => Err(AnalysisError::InternalError(
                "analysis triggered but no image data found in session".to_string(),
            )),
        };

        if let Err(e) = &outcome {
            log::error!("❌ Analysis failed ({}): {}", e.kind(), e);
        }

        self.outcome.insert(outcome)
    }

    /// Views for the cached outcome, if there is one.
    pub fn render(&self) -> Option<Result<RenderModel, &AnalysisError>> {
        self.outcome.as_ref().map(|outcome| match outcome {
            Ok(analysis) => Ok(build_render_model(&analysis.record, &analysis.raw_output)),
            Err(e) => Err(e),
        })
    }
}
