//! Project/demo reference extraction from the page URL.

use url::form_urlencoded;

/// Query parameter carrying the reference when the editor is open
pub const EDITOR_PARAM: &str = "copilotEditor";

/// Query parameter carrying the reference in preview mode
pub const PREVIEW_PARAM: &str = "copilotPreview";

/// Reference to one demo inside one project, parsed from the page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDemoRef {
    pub project_id: String,
    pub demo_id: String,
}

impl ProjectDemoRef {
    /// Parse a reference out of a raw query string (`a=b&c=d`, a leading
    /// `?` is accepted).
    ///
    /// `copilotEditor` wins over `copilotPreview` when both carry a
    /// non-empty value, regardless of their order in the query.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        let param_value = [EDITOR_PARAM, PREVIEW_PARAM].iter().find_map(|param| {
            pairs
                .iter()
                .find(|(key, value)| key.as_str() == *param && !value.is_empty())
                .map(|(_, value)| value.as_str())
        })?;

        Self::from_param(param_value)
    }

    /// Parse the raw `<projectId>/<demoId>[/...]` parameter value.
    ///
    /// Requires at least two slash-delimited segments; anything past the
    /// second segment is ignored.
    pub fn from_param(value: &str) -> Option<Self> {
        let mut segments = value.split('/');
        let project_id = segments.next()?;
        let demo_id = segments.next()?;

        Some(Self {
            project_id: project_id.to_string(),
            demo_id: demo_id.to_string(),
        })
    }
}
