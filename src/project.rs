//! Remote project data model and the authenticated project read.

use crate::error::UploadError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Location of the page element an edit applies to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetInfo {
    #[serde(rename = "xPath", default)]
    pub x_path: String,
}

/// A single requested content change produced by the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRecord {
    pub id: String,
    #[serde(rename = "sourceUrl", default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(
        rename = "sourceImageId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_image_id: Option<String>,
    #[serde(rename = "targetInfo", default)]
    pub target_info: TargetInfo,
}

/// A named collection of edit records scoped to one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoData {
    pub id: String,
    #[serde(default)]
    pub edits: Option<Vec<EditRecord>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub demos: Vec<DemoData>,
}

impl ProjectData {
    /// Find the demo matching a reference's demo id.
    pub fn demo(&self, demo_id: &str) -> Option<&DemoData> {
        self.demos.iter().find(|demo| demo.id == demo_id)
    }
}

/// Authenticated read access to the remote project store.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn fetch_project(
        &self,
        project_id: &str,
        token: &str,
    ) -> Result<ProjectData, UploadError>;
}

/// reqwest-backed [`ProjectApi`] implementation.
pub struct HttpProjectApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProjectApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ProjectApi for HttpProjectApi {
    async fn fetch_project(
        &self,
        project_id: &str,
        token: &str,
    ) -> Result<ProjectData, UploadError> {
        let url = format!(
            "{}/projects/{}",
            self.base_url.trim_end_matches('/'),
            project_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| UploadError::FetchFailure(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UploadError::FetchFailure(format!(
                "Project fetch failed with status {}: {}",
                status, error_text
            )));
        }

        response
            .json::<ProjectData>()
            .await
            .map_err(|e| UploadError::FetchFailure(format!("Failed to parse project data: {}", e)))
    }
}
