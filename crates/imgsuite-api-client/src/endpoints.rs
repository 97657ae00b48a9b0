//! URL composition for the image endpoints.
//!
//! Pure functions of the base URL and the image id: the same inputs always produce
//! the same string, so variant URLs are safe to cache or hand to an `<img src>`.

use imgsuite_core::Variant;

const IMAGES_PATH: &str = "/api/images";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// Trailing slashes on `base_url` are dropped. An empty base yields host-relative paths.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn images(&self) -> String {
        self.build_url(IMAGES_PATH)
    }

    /// The id is percent-encoded as one path segment, so distinct ids never collide.
    pub fn image(&self, id: &str) -> String {
        self.build_url(&format!("{}/{}", IMAGES_PATH, urlencoding::encode(id)))
    }

    pub fn process(&self, id: &str) -> String {
        format!("{}/process", self.image(id))
    }

    pub fn status(&self, id: &str) -> String {
        format!("{}/status", self.image(id))
    }

    pub fn edit(&self, id: &str) -> String {
        format!("{}/edit", self.image(id))
    }

    pub fn variant(&self, id: &str, variant: Variant) -> String {
        format!("{}/{}", self.image(id), variant.path_segment())
    }

    pub fn original_url(&self, id: &str) -> String {
        self.variant(id, Variant::Original)
    }

    pub fn processed_url(&self, id: &str) -> String {
        self.variant(id, Variant::Processed)
    }

    pub fn edited_url(&self, id: &str) -> String {
        self.variant(id, Variant::Edited)
    }
}
