//! Upload payload assembly.
//!
//! Drives reference decoding, the project fetch, edit mapping, and user
//! identification in sequence. Any missing intermediate short-circuits
//! with a typed cause; partial payloads are never produced. The dispatcher
//! treats every assembly error as "nothing to upload", not as a failure.

use crate::demo_ref::ProjectDemoRef;
use crate::edits::{map_edits, ImageUpdate};
use crate::error::UploadError;
use crate::page::PageContext;
use crate::project::ProjectApi;
use crate::storage::{self, StorageScope};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Fixed payload type marker expected by the asset service
pub const PAYLOAD_TYPE: &str = "xwlak-copilot-assisted";

/// AEM author instance receiving the imported assets
pub const AEM_URL: &str = "https://author-p121371-e1189853.adobeaemcloud.com/";

/// Project name used when the fetched project carries none
pub const DEFAULT_PROJECT_NAME: &str = "defaultName";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPayload {
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(rename = "type")]
    pub payload_type: String,
    #[serde(rename = "userLdap")]
    pub user_ldap: String,
    #[serde(rename = "aemURL")]
    pub aem_url: String,
    pub images: Vec<ImageUpdate>,
}

/// Assemble the upload payload for the demo referenced by the page URL.
///
/// Fails at the first missing intermediate: malformed reference, failed
/// project fetch, no matching demo, no mapped edits, or an unresolvable
/// user ldap. The cause is logged at the step producing it.
pub async fn build_payload(
    session_scope: &dyn StorageScope,
    page: &dyn PageContext,
    project_api: &dyn ProjectApi,
    token: &str,
) -> Result<UploadPayload, UploadError> {
    let query = page.query_string();
    let Some(demo_ref) = ProjectDemoRef::from_query(&query) else {
        error!("Invalid project/demo IDs in URL");
        return Err(UploadError::MissingReference(query));
    };

    let project = project_api
        .fetch_project(&demo_ref.project_id, token)
        .await
        .map_err(|e| {
            error!("Error fetching project data: {}", e);
            e
        })?;

    let Some(target_demo) = project.demo(&demo_ref.demo_id) else {
        error!(demo_id = %demo_ref.demo_id, "Demo not found in project data");
        return Err(UploadError::NoMatchingDemo(demo_ref.demo_id));
    };

    let images = map_edits(target_demo, page).ok_or_else(|| {
        error!("No valid updates found in demo data");
        UploadError::EmptyEditSet(demo_ref.demo_id.clone())
    })?;

    if images.is_empty() {
        error!(demo_id = %demo_ref.demo_id, "Demo has no edits to upload");
        return Err(UploadError::EmptyEditSet(demo_ref.demo_id));
    }

    let Some(user_ldap) = storage::user_ldap(session_scope) else {
        error!("Could not retrieve user LDAP");
        return Err(UploadError::MissingUserIdentifier);
    };

    Ok(UploadPayload {
        project_name: project
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
        payload_type: PAYLOAD_TYPE.to_string(),
        user_ldap,
        aem_url: AEM_URL.to_string(),
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{DemoData, EditRecord, ProjectData, TargetInfo};
    use crate::storage::{MemoryStorage, PROFILE_KEY};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakePage {
        query: String,
    }

    impl PageContext for FakePage {
        fn query_string(&self) -> String {
            self.query.clone()
        }

        fn element_dom_id(&self, _edit_id: &str) -> Option<String> {
            None
        }
    }

    struct FakeProjectApi {
        project: ProjectData,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProjectApi {
        fn new(project: ProjectData) -> Self {
            Self {
                project,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProjectApi for FakeProjectApi {
        async fn fetch_project(
            &self,
            project_id: &str,
            _token: &str,
        ) -> Result<ProjectData, UploadError> {
            self.calls.lock().unwrap().push(project_id.to_string());
            Ok(self.project.clone())
        }
    }

    struct FailingProjectApi;

    #[async_trait]
    impl ProjectApi for FailingProjectApi {
        async fn fetch_project(
            &self,
            _project_id: &str,
            _token: &str,
        ) -> Result<ProjectData, UploadError> {
            Err(UploadError::FetchFailure(
                "Project fetch failed with status 500 Internal Server Error: boom".to_string(),
            ))
        }
    }

    fn project_with_demo() -> ProjectData {
        ProjectData {
            name: Some("Holiday Campaign".to_string()),
            demos: vec![DemoData {
                id: "d1".to_string(),
                edits: Some(vec![EditRecord {
                    id: "e1".to_string(),
                    source_url: Some("https://cdn.example.com/a.png".to_string()),
                    source_image_id: Some("img-1".to_string()),
                    target_info: TargetInfo {
                        x_path: "/x/1".to_string(),
                    },
                }]),
            }],
        }
    }

    fn session_with_email() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.set_item(PROFILE_KEY, r#"{"email":"jdoe@example.com"}"#);
        storage
    }

    fn editor_page(reference: &str) -> FakePage {
        FakePage {
            query: format!("copilotEditor={}", reference),
        }
    }

    #[tokio::test]
    async fn test_builds_full_payload() {
        let page = editor_page("p1/d1");
        let api = FakeProjectApi::new(project_with_demo());
        let session = session_with_email();

        let payload = build_payload(&session, &page, &api, "token")
            .await
            .unwrap();

        assert_eq!(payload.project_name, "Holiday Campaign");
        assert_eq!(payload.payload_type, PAYLOAD_TYPE);
        assert_eq!(payload.user_ldap, "jdoe");
        assert_eq!(payload.aem_url, AEM_URL);
        assert_eq!(payload.images.len(), 1);
        assert_eq!(api.calls.lock().unwrap().as_slice(), ["p1"]);
    }

    #[tokio::test]
    async fn test_unnamed_project_gets_placeholder_name() {
        let mut project = project_with_demo();
        project.name = None;

        let api = FakeProjectApi::new(project);
        let session = session_with_email();

        let payload = build_payload(&session, &editor_page("p1/d1"), &api, "token")
            .await
            .unwrap();
        assert_eq!(payload.project_name, DEFAULT_PROJECT_NAME);
    }

    #[tokio::test]
    async fn test_malformed_reference_skips_fetch() {
        let api = FakeProjectApi::new(project_with_demo());
        let session = session_with_email();

        let err = build_payload(&session, &editor_page("justone"), &api, "token")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingReference(_)));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_typed() {
        let session = session_with_email();

        let err = build_payload(&session, &editor_page("p1/d1"), &FailingProjectApi, "token")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::FetchFailure(_)));
    }

    #[tokio::test]
    async fn test_unmatched_demo() {
        let api = FakeProjectApi::new(project_with_demo());
        let session = session_with_email();

        let err = build_payload(&session, &editor_page("p1/other-demo"), &api, "token")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::NoMatchingDemo(id) if id == "other-demo"));
    }

    #[tokio::test]
    async fn test_demo_without_edits() {
        let mut project = project_with_demo();
        project.demos[0].edits = None;

        let api = FakeProjectApi::new(project);
        let session = session_with_email();

        let err = build_payload(&session, &editor_page("p1/d1"), &api, "token")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::EmptyEditSet(_)));
    }

    #[tokio::test]
    async fn test_empty_edit_list() {
        let mut project = project_with_demo();
        project.demos[0].edits = Some(Vec::new());

        let api = FakeProjectApi::new(project);
        let session = session_with_email();

        let err = build_payload(&session, &editor_page("p1/d1"), &api, "token")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::EmptyEditSet(_)));
    }

    #[tokio::test]
    async fn test_missing_profile_uses_fallback_ldap() {
        let api = FakeProjectApi::new(project_with_demo());
        let session = MemoryStorage::new();

        let payload = build_payload(&session, &editor_page("p1/d1"), &api, "token")
            .await
            .unwrap();
        assert_eq!(payload.user_ldap, crate::storage::FALLBACK_LDAP);
    }

    #[test]
    fn test_payload_wire_names() {
        let payload = UploadPayload {
            project_name: "p".to_string(),
            payload_type: PAYLOAD_TYPE.to_string(),
            user_ldap: "jdoe".to_string(),
            aem_url: AEM_URL.to_string(),
            images: Vec::new(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"projectName\":\"p\""));
        assert!(json.contains("\"type\":\"xwlak-copilot-assisted\""));
        assert!(json.contains("\"userLdap\":\"jdoe\""));
        assert!(json.contains("\"aemURL\""));
        assert!(json.contains("\"images\":[]"));
    }
}
