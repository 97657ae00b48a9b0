//! Test helpers: an in-memory backend and small file fixtures.
//!
//! `FakeBackend` implements `ImageApi` with the same observable contract as the real
//! service: ids assigned on upload, `processing` after a trigger, `completed` after a
//! configurable number of status polls, 404 for unknown ids.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use imgsuite_api_client::{
    ApiError, EditOperation, Failure, ImageApi, ImageMeta, ImagePage, ImageStatus, ImageUpload,
    OutputFormat,
};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    images: Vec<ImageMeta>,
    next_ids: VecDeque<String>,
    issued: u64,
    polls_until_complete: u32,
    polls: HashMap<String, u32>,
    reject_filename: Option<String>,
    calls: Vec<&'static str>,
}

#[derive(Default)]
pub struct FakeBackend {
    inner: Mutex<Inner>,
}

fn not_found(id: &str) -> Failure {
    Failure::Http {
        status: StatusCode::NOT_FOUND,
        body: format!("Image {} not found", id),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processing completes on the `n`th status poll after a trigger.
    pub fn completing_after(self, n: u32) -> Self {
        self.inner.lock().unwrap().polls_until_complete = n;
        self
    }

    /// Hand out these ids, in order, to the next uploads.
    pub fn with_ids(self, ids: &[&str]) -> Self {
        self.inner
            .lock()
            .unwrap()
            .next_ids
            .extend(ids.iter().map(|id| id.to_string()));
        self
    }

    /// Uploads of this file name fail with 413.
    pub fn rejecting(self, filename: &str) -> Self {
        self.inner.lock().unwrap().reject_filename = Some(filename.to_string());
        self
    }

    pub fn seed(&self, meta: ImageMeta) {
        self.inner.lock().unwrap().images.push(meta);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn image_count(&self) -> usize {
        self.inner.lock().unwrap().images.len()
    }
}

#[async_trait]
impl ImageApi for FakeBackend {
    async fn list_images(&self, page: u32, page_size: u32) -> Result<ImagePage, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("list");
        if page == 0 || page_size == 0 {
            return Err(ApiError::List(Failure::InvalidInput("zero".into())));
        }
        let start = ((page - 1) * page_size) as usize;
        let items: Vec<ImageMeta> = inner
            .images
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(ImagePage {
            items,
            total: inner.images.len() as u64,
            page: Some(page),
            page_size: Some(page_size),
        })
    }

    async fn upload_image(&self, upload: ImageUpload) -> Result<ImageMeta, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("upload");
        if inner.reject_filename.as_deref() == Some(upload.filename.as_str()) {
            return Err(ApiError::Upload(Failure::Http {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                body: "file too large".into(),
            }));
        }
        inner.issued += 1;
        let issued = inner.issued;
        let id = inner
            .next_ids
            .pop_front()
            .unwrap_or_else(|| format!("img-{}", issued));
        let meta = ImageMeta::new(id, upload.filename, ImageStatus::Uploaded);
        inner.images.push(meta.clone());
        Ok(meta)
    }

    async fn trigger_process(
        &self,
        id: &str,
        _operation: &str,
        _params: &Value,
    ) -> Result<ImageMeta, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("process");
        inner.polls.insert(id.to_string(), 0);
        let image = inner
            .images
            .iter_mut()
            .find(|image| image.id == id)
            .ok_or_else(|| ApiError::Process(not_found(id)))?;
        image.status = ImageStatus::Processing;
        Ok(image.clone())
    }

    async fn get_status(&self, id: &str) -> Result<ImageMeta, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("status");
        let threshold = inner.polls_until_complete;
        let polls = inner.polls.entry(id.to_string()).or_insert(0);
        *polls += 1;
        let polls = *polls;
        let image = inner
            .images
            .iter_mut()
            .find(|image| image.id == id)
            .ok_or_else(|| ApiError::Status(not_found(id)))?;
        if image.status == ImageStatus::Processing && polls >= threshold {
            image.status = ImageStatus::Completed;
        }
        Ok(image.clone())
    }

    async fn edit_image(
        &self,
        id: &str,
        operation: &EditOperation,
        output_format: Option<OutputFormat>,
    ) -> Result<ImageMeta, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("edit");
        let image = inner
            .images
            .iter_mut()
            .find(|image| image.id == id)
            .ok_or_else(|| ApiError::Edit(not_found(id)))?;
        image
            .extra
            .insert("last_edit".into(), Value::String(operation.name().into()));
        if let Some(format) = output_format {
            image
                .extra
                .insert("edited_format".into(), Value::String(format.to_string()));
        }
        Ok(image.clone())
    }

    async fn delete_image(&self, id: &str) -> Result<bool, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("delete");
        let before = inner.images.len();
        inner.images.retain(|image| image.id != id);
        if inner.images.len() == before {
            return Err(ApiError::Delete(not_found(id)));
        }
        Ok(true)
    }
}
