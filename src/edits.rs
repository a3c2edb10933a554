//! Mapping of demo edit records into upload-ready image updates.

use crate::page::{PageContext, EDIT_ID_ATTRIBUTE};
use crate::project::{DemoData, EditRecord};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One image change ready for upload, derived from one [`EditRecord`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUpdate {
    #[serde(rename = "importedUrl")]
    pub imported_url: String,
    #[serde(rename = "pathToModify")]
    pub path_to_modify: String,
    pub name: String,
    #[serde(rename = "originalEdit")]
    pub original_edit: EditRecord,
    #[serde(rename = "editId")]
    pub edit_id: String,
}

/// Map a demo's edit records into image updates, order preserving.
///
/// `None` when the demo carries no edits field at all. Individual edits are
/// never dropped: a missing tagged element falls back to the edit's xPath,
/// and missing optional source fields degrade to empty strings.
pub fn map_edits(demo: &DemoData, page: &dyn PageContext) -> Option<Vec<ImageUpdate>> {
    let edits = demo.edits.as_ref()?;

    let updates = edits
        .iter()
        .map(|edit| {
            let path_to_modify = match page.element_dom_id(&edit.id) {
                Some(dom_id) => dom_id,
                None => {
                    warn!(
                        edit_id = %edit.id,
                        attribute = EDIT_ID_ATTRIBUTE,
                        "No tagged element found for edit, using xPath"
                    );
                    edit.target_info.x_path.clone()
                }
            };

            ImageUpdate {
                imported_url: edit.source_url.clone().unwrap_or_default(),
                path_to_modify,
                name: edit.source_image_id.clone().unwrap_or_default(),
                original_edit: edit.clone(),
                edit_id: edit.id.clone(),
            }
        })
        .collect();

    Some(updates)
}
