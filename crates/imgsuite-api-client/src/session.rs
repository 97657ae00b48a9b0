//! Drives the headless [`Store`] against an [`ImageApi`].
//!
//! `run` dispatches an action, executes every effect it produces with one backend
//! call each, and feeds the completions back until the store goes quiet.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::api::ImageApi;
use crate::error::{ApiError, Failure};
use imgsuite_core::models::ImageUpload;
use imgsuite_core::state::{Action, AppState, Effect, Store};

pub struct Session<A> {
    api: A,
    store: Store,
}

impl<A: ImageApi> Session<A> {
    pub fn new(api: A, state: AppState) -> Self {
        Self {
            api,
            store: Store::new(state),
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn into_state(self) -> AppState {
        self.store.into_state()
    }

    /// Dispatch `action` and settle every request it causes.
    pub async fn run(&mut self, action: Action) -> &AppState {
        let mut queue: VecDeque<Effect> = self.store.dispatch(action).effects.into();
        while let Some(effect) = queue.pop_front() {
            let completion = self.execute(effect).await;
            queue.extend(self.store.dispatch(completion).effects);
        }
        self.store.state()
    }

    async fn execute(&self, effect: Effect) -> Action {
        match effect {
            Effect::FetchPage { page, page_size } => Action::PageLoaded {
                page,
                result: self
                    .api
                    .list_images(page, page_size)
                    .await
                    .map_err(|e| e.to_string()),
            },
            Effect::UploadFiles(paths) => self.upload_batch(paths).await,
            Effect::TriggerProcess {
                id,
                operation,
                params,
            } => {
                let result = self.api.trigger_process(&id, &operation, &params).await;
                Action::ProcessFinished {
                    id,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            Effect::FetchStatus { id } => {
                let result = self.api.get_status(&id).await;
                Action::StatusFinished {
                    id,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            Effect::ApplyEdit {
                id,
                operation,
                output_format,
            } => {
                let result = self.api.edit_image(&id, &operation, output_format).await;
                Action::EditFinished {
                    id,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            Effect::DeleteImage { id } => {
                let result = self.api.delete_image(&id).await;
                Action::DeleteFinished {
                    id,
                    result: result.map_err(|e| e.to_string()),
                }
            }
        }
    }

    /// Sequential uploads; stops at the first failure without undoing earlier ones.
    async fn upload_batch(&self, paths: Vec<PathBuf>) -> Action {
        let mut uploaded = Vec::with_capacity(paths.len());
        for path in paths {
            let result = match ImageUpload::from_path(&path) {
                Ok(upload) => self.api.upload_image(upload).await,
                Err(e) => Err(ApiError::Upload(Failure::Io(e))),
            };
            match result {
                Ok(meta) => uploaded.push(meta),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Upload batch stopped");
                    return Action::UploadFinished {
                        uploaded,
                        error: Some(e.to_string()),
                    };
                }
            }
        }
        Action::UploadFinished {
            uploaded,
            error: None,
        }
    }
}
