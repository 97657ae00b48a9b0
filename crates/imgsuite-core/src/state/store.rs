use super::{Action, AppState, Control, Effect, EDIT_APPLIED, EDIT_FAILED, EDIT_IN_PROGRESS};
use crate::models::ImageMeta;

#[derive(Debug)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn into_state(self) -> AppState {
        self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        let before = self.state.clone();
        let effects = self.reduce(action);
        DispatchResult {
            state_changed: self.state != before,
            effects,
        }
    }

    fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Refresh => {
                if !self.state.is_loading() {
                    self.state.error = None;
                }
                self.request_page()
            }
            Action::SetPage(page) => self.go_to_page(page),
            Action::NextPage => self.go_to_page(self.state.page.saturating_add(1)),
            Action::PrevPage => self.go_to_page(self.state.page.saturating_sub(1)),
            Action::SetQuery(query) => {
                self.state.query = query;
                Vec::new()
            }
            Action::Select(id) => {
                self.state.selected = id;
                Vec::new()
            }
            Action::OpenEditor(id) => {
                self.state.selected = Some(id.clone());
                self.state.edit_target = Some(id);
                Vec::new()
            }
            Action::CloseEditor => {
                self.state.edit_target = None;
                self.state.edit_message = None;
                Vec::new()
            }
            Action::ClearError => {
                self.state.error = None;
                Vec::new()
            }
            Action::Upload(paths) => {
                if paths.is_empty() || !self.start(Control::Upload) {
                    return Vec::new();
                }
                vec![Effect::UploadFiles(paths)]
            }
            Action::Process {
                id,
                operation,
                params,
            } => {
                if !self.start(Control::Process(id.clone())) {
                    return Vec::new();
                }
                vec![Effect::TriggerProcess {
                    id,
                    operation,
                    params,
                }]
            }
            Action::PollStatus { id } => {
                if !self.start(Control::Status(id.clone())) {
                    return Vec::new();
                }
                vec![Effect::FetchStatus { id }]
            }
            Action::Edit {
                id,
                operation,
                output_format,
            } => {
                if !self.start(Control::Edit(id.clone())) {
                    return Vec::new();
                }
                self.state.edit_message = Some(EDIT_IN_PROGRESS.to_string());
                vec![Effect::ApplyEdit {
                    id,
                    operation,
                    output_format,
                }]
            }
            Action::Delete { id } => {
                if !self.start(Control::Delete(id.clone())) {
                    return Vec::new();
                }
                vec![Effect::DeleteImage { id }]
            }
            Action::PageLoaded { page, result } => {
                self.state.pending.remove(&Control::Refresh);
                match result {
                    Ok(listing) if page == self.state.page => {
                        self.state.images = listing.items;
                        self.state.total = listing.total;
                    }
                    Ok(_) => {
                        tracing::debug!(page, current = self.state.page, "Dropping stale page");
                    }
                    Err(message) => self.fail(message),
                }
                if std::mem::take(&mut self.state.refresh_queued) {
                    return self.request_page();
                }
                Vec::new()
            }
            Action::UploadFinished { uploaded, error } => {
                self.state.pending.remove(&Control::Upload);
                let any_uploaded = !uploaded.is_empty();
                if let Some(message) = error {
                    self.fail(message);
                }
                if any_uploaded {
                    return self.request_page();
                }
                Vec::new()
            }
            Action::ProcessFinished { id, result } => {
                self.state.pending.remove(&Control::Process(id));
                match result {
                    Ok(meta) => {
                        self.apply_meta(meta);
                        self.request_page()
                    }
                    Err(message) => {
                        self.fail(message);
                        Vec::new()
                    }
                }
            }
            Action::StatusFinished { id, result } => {
                self.state.pending.remove(&Control::Status(id));
                match result {
                    Ok(meta) => self.apply_meta(meta),
                    Err(message) => self.fail(message),
                }
                Vec::new()
            }
            Action::EditFinished { id, result } => {
                self.state.pending.remove(&Control::Edit(id));
                match result {
                    Ok(meta) => {
                        self.apply_meta(meta);
                        self.state.edit_message = Some(EDIT_APPLIED.to_string());
                    }
                    Err(message) => {
                        self.fail(message);
                        self.state.edit_message = Some(EDIT_FAILED.to_string());
                    }
                }
                Vec::new()
            }
            Action::DeleteFinished { id, result } => {
                self.state.pending.remove(&Control::Delete(id.clone()));
                match result {
                    Ok(_) => {
                        self.remove_image(&id);
                        self.request_page()
                    }
                    Err(message) => {
                        self.fail(message);
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Mark a control busy. Returns false when it already was.
    fn begin(&mut self, control: Control) -> bool {
        if self.state.pending.contains(&control) {
            tracing::debug!(?control, "Ignoring request while control is pending");
            return false;
        }
        self.state.pending.insert(control);
        true
    }

    /// User-initiated request: a fresh attempt clears the previous failure.
    fn start(&mut self, control: Control) -> bool {
        if !self.begin(control) {
            return false;
        }
        self.state.error = None;
        true
    }

    fn request_page(&mut self) -> Vec<Effect> {
        if !self.begin(Control::Refresh) {
            self.state.refresh_queued = true;
            return Vec::new();
        }
        vec![Effect::FetchPage {
            page: self.state.page,
            page_size: self.state.page_size,
        }]
    }

    fn go_to_page(&mut self, page: u32) -> Vec<Effect> {
        if self.state.is_loading() {
            return Vec::new();
        }
        let page = page.clamp(1, self.state.total_pages());
        if page == self.state.page {
            return Vec::new();
        }
        self.state.page = page;
        self.state.error = None;
        self.request_page()
    }

    /// Server response is the source of truth for its id.
    fn apply_meta(&mut self, meta: ImageMeta) {
        match self.state.images.iter_mut().find(|image| image.id == meta.id) {
            Some(existing) => existing.merge_from(meta),
            None => tracing::debug!(id = %meta.id, "Response for image outside current page"),
        }
    }

    fn remove_image(&mut self, id: &str) {
        let before = self.state.images.len();
        self.state.images.retain(|image| image.id != id);
        if self.state.images.len() < before {
            self.state.total = self.state.total.saturating_sub(1);
        }
        if self.state.selected.as_deref() == Some(id) {
            self.state.selected = None;
        }
        if self.state.edit_target.as_deref() == Some(id) {
            self.state.edit_target = None;
        }
    }

    fn fail(&mut self, message: String) {
        self.state.error = Some(message);
    }
}
