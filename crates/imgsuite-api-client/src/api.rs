//! Domain methods for the image backend.
//!
//! Each method performs exactly one request: no retries, no caching. The variant URL
//! builders perform none.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::Value;
use std::path::Path;

use crate::error::{ApiError, Failure};
use crate::{ensure_success, http_failure, read_json, send, ApiClient};
use imgsuite_core::models::{
    EditOperation, ImageMeta, ImagePage, ImageUpload, OutputFormat, Variant,
};

/// The backend operations, as a seam between the session runner and the transport.
#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn list_images(&self, page: u32, page_size: u32) -> Result<ImagePage, ApiError>;

    async fn upload_image(&self, upload: ImageUpload) -> Result<ImageMeta, ApiError>;

    async fn trigger_process(
        &self,
        id: &str,
        operation: &str,
        params: &Value,
    ) -> Result<ImageMeta, ApiError>;

    async fn get_status(&self, id: &str) -> Result<ImageMeta, ApiError>;

    async fn edit_image(
        &self,
        id: &str,
        operation: &EditOperation,
        output_format: Option<OutputFormat>,
    ) -> Result<ImageMeta, ApiError>;

    /// `Ok(true)` only on `204 No Content`.
    async fn delete_image(&self, id: &str) -> Result<bool, ApiError>;
}

impl ApiClient {
    /// List one page of images. `page` is 1-based; both arguments must be positive.
    pub async fn list_images(&self, page: u32, page_size: u32) -> Result<ImagePage, ApiError> {
        if page == 0 || page_size == 0 {
            return Err(ApiError::List(Failure::InvalidInput(format!(
                "page and page_size must be positive (got {}, {})",
                page, page_size
            ))));
        }

        let url = self.endpoints().images();
        let query = [("page", page.to_string()), ("page_size", page_size.to_string())];
        let response = send(self.client().get(&url).query(&query))
            .await
            .map_err(ApiError::List)?;
        tracing::debug!(method = "GET", %url, page, page_size, status = %response.status(), "List images");

        let response = ensure_success(response).await.map_err(ApiError::List)?;
        let listing: ImagePage = read_json(response).await.map_err(ApiError::List)?;
        if !listing.is_consistent(page_size) {
            tracing::warn!(
                items = listing.items.len(),
                total = listing.total,
                page_size,
                "Backend returned an inconsistent page"
            );
        }
        Ok(listing)
    }

    /// Upload an image as the multipart field `file`. Non-image content is refused locally.
    pub async fn upload_image(&self, upload: ImageUpload) -> Result<ImageMeta, ApiError> {
        if !upload.is_image() {
            return Err(ApiError::Upload(Failure::InvalidInput(format!(
                "{} is not an image ({})",
                upload.filename, upload.content_type
            ))));
        }

        let ImageUpload {
            filename,
            content_type,
            bytes,
        } = upload;
        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str(&content_type)
            .map_err(|e| ApiError::Upload(Failure::InvalidInput(e.to_string())))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = self.endpoints().images();
        let response = send(self.client().post(&url).multipart(form))
            .await
            .map_err(ApiError::Upload)?;
        tracing::debug!(method = "POST", %url, %filename, size, status = %response.status(), "Upload image");

        let response = ensure_success(response).await.map_err(ApiError::Upload)?;
        let mut meta: ImageMeta = read_json(response).await.map_err(ApiError::Upload)?;
        if meta.filename.is_empty() {
            meta.filename = filename;
        }
        Ok(meta)
    }

    /// Read a local file and upload it.
    pub async fn upload_image_path(&self, path: &Path) -> Result<ImageMeta, ApiError> {
        let upload = ImageUpload::from_path(path).map_err(|e| ApiError::Upload(Failure::Io(e)))?;
        self.upload_image(upload).await
    }

    /// Start asynchronous processing. The operation and its params are passed through as-is.
    pub async fn trigger_process(
        &self,
        id: &str,
        operation: &str,
        params: &Value,
    ) -> Result<ImageMeta, ApiError> {
        let url = self.endpoints().process(id);
        let body = serde_json::json!({ "operation": operation, "params": params });
        let response = send(self.client().post(&url).json(&body))
            .await
            .map_err(ApiError::Process)?;
        tracing::debug!(method = "POST", %url, operation, status = %response.status(), "Trigger processing");

        let response = ensure_success(response).await.map_err(ApiError::Process)?;
        read_json(response).await.map_err(ApiError::Process)
    }

    pub async fn get_status(&self, id: &str) -> Result<ImageMeta, ApiError> {
        let url = self.endpoints().status(id);
        let response = send(self.client().get(&url))
            .await
            .map_err(ApiError::Status)?;
        tracing::debug!(method = "GET", %url, status = %response.status(), "Fetch status");

        let response = ensure_success(response).await.map_err(ApiError::Status)?;
        read_json(response).await.map_err(ApiError::Status)
    }

    /// Apply an edit synchronously and return the updated record.
    pub async fn edit_image(
        &self,
        id: &str,
        operation: &EditOperation,
        output_format: Option<OutputFormat>,
    ) -> Result<ImageMeta, ApiError> {
        let body = operation
            .request_body(output_format)
            .map_err(|e| ApiError::Edit(Failure::InvalidInput(e.to_string())))?;

        let url = self.endpoints().edit(id);
        let response = send(self.client().post(&url).json(&body))
            .await
            .map_err(ApiError::Edit)?;
        tracing::debug!(
            method = "POST",
            %url,
            operation = operation.name(),
            status = %response.status(),
            "Edit image"
        );

        let response = ensure_success(response).await.map_err(ApiError::Edit)?;
        read_json(response).await.map_err(ApiError::Edit)
    }

    /// Delete an image and its content. Anything but `204 No Content` is a failure.
    pub async fn delete_image(&self, id: &str) -> Result<bool, ApiError> {
        let url = self.endpoints().image(id);
        let response = send(self.client().delete(&url))
            .await
            .map_err(ApiError::Delete)?;
        tracing::debug!(method = "DELETE", %url, status = %response.status(), "Delete image");

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(true);
        }
        Err(ApiError::Delete(http_failure(response).await))
    }

    /// Download the raw bytes of one variant.
    pub async fn fetch_variant(&self, id: &str, variant: Variant) -> Result<Bytes, ApiError> {
        let url = self.endpoints().variant(id, variant);
        let response = send(self.client().get(&url))
            .await
            .map_err(ApiError::Download)?;
        tracing::debug!(method = "GET", %url, status = %response.status(), "Fetch variant");

        let response = ensure_success(response).await.map_err(ApiError::Download)?;
        response
            .bytes()
            .await
            .map_err(|e| ApiError::Download(Failure::Transport(e)))
    }

    pub fn original_url(&self, id: &str) -> String {
        self.endpoints().original_url(id)
    }

    pub fn processed_url(&self, id: &str) -> String {
        self.endpoints().processed_url(id)
    }

    pub fn edited_url(&self, id: &str) -> String {
        self.endpoints().edited_url(id)
    }
}

#[async_trait]
impl ImageApi for ApiClient {
    async fn list_images(&self, page: u32, page_size: u32) -> Result<ImagePage, ApiError> {
        ApiClient::list_images(self, page, page_size).await
    }

    async fn upload_image(&self, upload: ImageUpload) -> Result<ImageMeta, ApiError> {
        ApiClient::upload_image(self, upload).await
    }

    async fn trigger_process(
        &self,
        id: &str,
        operation: &str,
        params: &Value,
    ) -> Result<ImageMeta, ApiError> {
        ApiClient::trigger_process(self, id, operation, params).await
    }

    async fn get_status(&self, id: &str) -> Result<ImageMeta, ApiError> {
        ApiClient::get_status(self, id).await
    }

    async fn edit_image(
        &self,
        id: &str,
        operation: &EditOperation,
        output_format: Option<OutputFormat>,
    ) -> Result<ImageMeta, ApiError> {
        ApiClient::edit_image(self, id, operation, output_format).await
    }

    async fn delete_image(&self, id: &str) -> Result<bool, ApiError> {
        ApiClient::delete_image(self, id).await
    }
}
