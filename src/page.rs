//! Page and UI collaborator contracts.
//!
//! The pipeline never touches a DOM or renders anything itself; hosts
//! implement these traits against their page environment.

/// Attribute used by the editor to tag page elements with their edit id
pub const EDIT_ID_ATTRIBUTE: &str = "data-demo-copilot-edit-id";

/// Popup notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupCategory {
    Success,
    Notice,
}

/// Read access to the hosting page.
pub trait PageContext: Send + Sync {
    /// Raw query string of the current location (leading '?' accepted)
    fn query_string(&self) -> String;

    /// The `id` of the element tagged with
    /// `data-demo-copilot-edit-id="<edit_id>"`. `None` when no such
    /// element exists or the element carries no id of its own.
    fn element_dom_id(&self, edit_id: &str) -> Option<String>;
}

/// On-page loading indicator and popup notifications.
pub trait UiNotifier: Send + Sync {
    fn show_loader(&self);
    fn hide_loader(&self);
    fn show_popup(&self, message: &str, category: PopupCategory);
}

/// Shows the loading indicator for as long as the guard lives.
///
/// Hiding is guaranteed on every exit path, including early returns and
/// propagated errors.
pub struct LoaderGuard<'a> {
    ui: &'a dyn UiNotifier,
}

impl<'a> LoaderGuard<'a> {
    pub fn show(ui: &'a dyn UiNotifier) -> Self {
        ui.show_loader();
        Self { ui }
    }
}

impl Drop for LoaderGuard<'_> {
    fn drop(&mut self) {
        self.ui.hide_loader();
    }
}
