//! Headless application state (state/action/effect).
//!
//! The UI's mutable state is one serializable [`AppState`] changed only through
//! [`Store::dispatch`]. The store never talks to the network; it returns
//! [`Effect`]s for a runner to execute and feed back as completion actions.

pub mod action;
pub mod effect;
pub mod store;

pub use action::Action;
pub use effect::Effect;
pub use store::{DispatchResult, Store};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::models::ImageMeta;

pub const EDIT_IN_PROGRESS: &str = "Applying edit…";
pub const EDIT_APPLIED: &str = "Edit applied successfully.";
pub const EDIT_FAILED: &str = "Edit failed.";

/// A triggering control. While pending, repeated requests from it are ignored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "control", content = "id", rename_all = "snake_case")]
pub enum Control {
    Refresh,
    Upload,
    Process(String),
    Status(String),
    Edit(String),
    Delete(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Current page of images in backend order; ids are unique.
    pub images: Vec<ImageMeta>,
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub query: String,
    pub selected: Option<String>,
    pub edit_target: Option<String>,
    /// Last failure, as shown to the user.
    pub error: Option<String>,
    pub edit_message: Option<String>,
    pub pending: BTreeSet<Control>,
    /// A list refresh was requested while another one was in flight.
    #[serde(default)]
    pub refresh_queued: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl AppState {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            images: Vec::new(),
            total: 0,
            page: 1,
            page_size: page_size.max(1),
            query: String::new(),
            selected: None,
            edit_target: None,
            error: None,
            edit_message: None,
            pending: BTreeSet::new(),
            refresh_queued: false,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let page_size = u64::from(self.page_size.max(1));
        let pages = self.total.div_ceil(page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Images on the current page matching the search query.
    pub fn filtered(&self) -> Vec<&ImageMeta> {
        self.images
            .iter()
            .filter(|image| image.matches_query(&self.query))
            .collect()
    }

    pub fn image(&self, id: &str) -> Option<&ImageMeta> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn selected_image(&self) -> Option<&ImageMeta> {
        self.selected.as_deref().and_then(|id| self.image(id))
    }

    pub fn edit_target_image(&self) -> Option<&ImageMeta> {
        self.edit_target.as_deref().and_then(|id| self.image(id))
    }

    pub fn is_pending(&self, control: &Control) -> bool {
        self.pending.contains(control)
    }

    pub fn is_loading(&self) -> bool {
        self.is_pending(&Control::Refresh)
    }

    pub fn is_uploading(&self) -> bool {
        self.is_pending(&Control::Upload)
    }
}
