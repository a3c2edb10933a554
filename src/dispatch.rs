//! Upload dispatch with a primary send and a one-shot opaque fallback.
//!
//! The dispatcher is the pipeline entry point: it gates on the stored
//! token, assembles the payload, and POSTs it. A failed primary send
//! triggers exactly one fallback attempt; there is no retry policy beyond
//! that.

use crate::config::{TransportMode, UploaderConfig};
use crate::error::UploadError;
use crate::page::{LoaderGuard, PageContext, PopupCategory, UiNotifier};
use crate::payload::{build_payload, UploadPayload};
use crate::project::{HttpProjectApi, ProjectApi};
use crate::storage::{self, StorageScope};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Phases the dispatcher moves through, traced per transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Authenticating,
    BuildingPayload,
    SendingPrimary,
    SendingFallback,
    Success,
    Failed,
}

/// Confidence level of a completed send.
///
/// `Dispatched` is deliberately weaker than `Delivered`: an opaque-mode
/// request gives no way to check the response status, so "success" only
/// means the request left without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The endpoint answered with a success status
    Delivered { status: u16 },
    /// The request was dispatched in opaque mode; no status is available
    Dispatched,
}

/// Terminal status of one `upload_asset` invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Sent,
    Skipped,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Write access to the remote asset service.
#[async_trait]
pub trait UploadApi: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        mode: TransportMode,
        payload: &UploadPayload,
    ) -> Result<SendOutcome, UploadError>;
}

/// reqwest-backed [`UploadApi`] implementation.
#[derive(Default)]
pub struct HttpUploadApi {
    client: reqwest::Client,
}

impl HttpUploadApi {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UploadApi for HttpUploadApi {
    async fn send(
        &self,
        endpoint: &str,
        mode: TransportMode,
        payload: &UploadPayload,
    ) -> Result<SendOutcome, UploadError> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| UploadError::UploadTransportFailure(format!("HTTP request failed: {}", e)))?;

        match mode {
            TransportMode::Cors => {
                let status = response.status();
                if !status.is_success() {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(UploadError::UploadTransportFailure(format!(
                        "Upload failed with status {}: {}",
                        status, error_text
                    )));
                }
                Ok(SendOutcome::Delivered {
                    status: status.as_u16(),
                })
            }
            // The response is opaque; dispatching without a transport error
            // is the strongest signal available
            TransportMode::Opaque => Ok(SendOutcome::Dispatched),
        }
    }
}

/// The upload pipeline entry point, wired to its collaborators.
pub struct AssetUploader {
    config: UploaderConfig,
    persistent_scope: Arc<dyn StorageScope>,
    session_scope: Arc<dyn StorageScope>,
    page: Arc<dyn PageContext>,
    ui: Arc<dyn UiNotifier>,
    project_api: Arc<dyn ProjectApi>,
    upload_api: Arc<dyn UploadApi>,
}

impl AssetUploader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: UploaderConfig,
        persistent_scope: Arc<dyn StorageScope>,
        session_scope: Arc<dyn StorageScope>,
        page: Arc<dyn PageContext>,
        ui: Arc<dyn UiNotifier>,
        project_api: Arc<dyn ProjectApi>,
        upload_api: Arc<dyn UploadApi>,
    ) -> Self {
        Self {
            config,
            persistent_scope,
            session_scope,
            page,
            ui,
            project_api,
            upload_api,
        }
    }

    /// Build an uploader with HTTP-backed project and upload collaborators
    /// derived from the configuration.
    pub fn with_http(
        config: UploaderConfig,
        persistent_scope: Arc<dyn StorageScope>,
        session_scope: Arc<dyn StorageScope>,
        page: Arc<dyn PageContext>,
        ui: Arc<dyn UiNotifier>,
    ) -> Self {
        let project_api = Arc::new(HttpProjectApi::new(config.project_api_url.clone()));
        let upload_api = Arc::new(HttpUploadApi::new());
        Self::new(
            config,
            persistent_scope,
            session_scope,
            page,
            ui,
            project_api,
            upload_api,
        )
    }

    /// Run the full upload pipeline once.
    ///
    /// Missing token and missing payload resolve to `Error` and `Skipped`
    /// outcomes respectively, without throwing. The only `Err` return is a
    /// transport failure on both the primary and fallback sends, in which
    /// case the primary attempt's error is surfaced. The loading indicator
    /// is hidden on every exit path and exactly one popup is shown.
    pub async fn upload_asset(&self) -> Result<UploadOutcome, UploadError> {
        self.trace_phase(DispatchPhase::Idle);
        let _loader = LoaderGuard::show(self.ui.as_ref());

        self.trace_phase(DispatchPhase::Authenticating);
        let Some(token) = storage::auth_token(self.persistent_scope.as_ref()) else {
            self.trace_phase(DispatchPhase::Failed);
            self.ui.show_popup(
                "Authentication token not found. Please log in again.",
                PopupCategory::Notice,
            );
            return Ok(UploadOutcome {
                status: UploadStatus::Error,
                message: Some("Authentication token not found".to_string()),
            });
        };

        self.trace_phase(DispatchPhase::BuildingPayload);
        let payload = match build_payload(
            self.session_scope.as_ref(),
            self.page.as_ref(),
            self.project_api.as_ref(),
            &token,
        )
        .await
        {
            Ok(payload) => payload,
            Err(cause) => {
                // Nothing to send is a no-op, not a failure
                info!("Skipping upload: {}", cause);
                self.ui
                    .show_popup("No updates available for asset upload", PopupCategory::Notice);
                return Ok(UploadOutcome {
                    status: UploadStatus::Skipped,
                    message: Some("No updates available".to_string()),
                });
            }
        };

        debug!(
            images = payload.images.len(),
            project = %payload.project_name,
            "Assembled upload payload"
        );

        self.trace_phase(DispatchPhase::SendingPrimary);
        let primary = self
            .upload_api
            .send(&self.config.upload_url, self.config.upload_transport, &payload)
            .await;

        let outcome = match primary {
            Ok(outcome) => outcome,
            Err(primary_err) => {
                warn!("Primary upload failed, attempting fallback: {}", primary_err);
                self.trace_phase(DispatchPhase::SendingFallback);

                match self.send_fallback(&payload).await {
                    Ok(outcome) => outcome,
                    Err(fallback_err) => {
                        self.trace_phase(DispatchPhase::Failed);
                        error!("Fallback upload failed: {}", fallback_err);
                        self.ui.show_popup(
                            "Failed to upload assets. Please try again.",
                            PopupCategory::Notice,
                        );
                        // Surface the error that triggered the fallback
                        return Err(primary_err);
                    }
                }
            }
        };

        self.trace_phase(DispatchPhase::Success);
        info!(images = payload.images.len(), "Assets uploaded");
        self.ui
            .show_popup("Assets uploaded successfully", PopupCategory::Success);

        let message = match outcome {
            SendOutcome::Delivered { status } => {
                format!("Upload accepted with status {}", status)
            }
            SendOutcome::Dispatched => "Request dispatched in opaque mode".to_string(),
        };

        Ok(UploadOutcome {
            status: UploadStatus::Sent,
            message: Some(message),
        })
    }

    /// One-shot fallback send to the secondary endpoint.
    ///
    /// The token is re-read first (it may have been refreshed since the
    /// primary attempt); a vanished token fails the fallback.
    async fn send_fallback(&self, payload: &UploadPayload) -> Result<SendOutcome, UploadError> {
        if storage::auth_token(self.persistent_scope.as_ref()).is_none() {
            return Err(UploadError::MissingCredential(
                "Token no longer present for fallback send".to_string(),
            ));
        }

        self.upload_api
            .send(
                &self.config.fallback_upload_url,
                self.config.fallback_transport,
                payload,
            )
            .await
    }

    fn trace_phase(&self, phase: DispatchPhase) {
        debug!(phase = ?phase, "Upload dispatch phase");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_status_wire_names() {
        assert_eq!(serde_json::to_string(&UploadStatus::Sent).unwrap(), "\"sent\"");
        assert_eq!(
            serde_json::to_string(&UploadStatus::Skipped).unwrap(),
            "\"skipped\""
        );
        assert_eq!(
            serde_json::to_string(&UploadStatus::Error).unwrap(),
            "\"error\""
        );
    }

    #[test]
    fn test_outcome_omits_absent_message() {
        let outcome = UploadOutcome {
            status: UploadStatus::Sent,
            message: None,
        };
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"status":"sent"}"#
        );
    }

    #[test]
    fn test_send_outcomes_are_distinct_confidence_levels() {
        assert_ne!(SendOutcome::Delivered { status: 200 }, SendOutcome::Dispatched);
    }
}
