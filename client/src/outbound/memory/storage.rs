//! In-process avatar object storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::domain::ports::{AvatarStorage, AvatarStorageError, AvatarUpload};

use super::lock;

const DEFAULT_BUCKET_URL: &str = "https://storage.movie-diary.invalid/";

#[derive(Default)]
struct Objects {
    stored: HashMap<String, AvatarUpload>,
    rejecting: bool,
}

/// Uploaded pictures keyed by object path.
#[derive(Clone)]
pub struct InMemoryAvatarStorage {
    bucket: Url,
    objects: Arc<Mutex<Objects>>,
}

impl InMemoryAvatarStorage {
    /// Storage whose download URLs are resolved against `bucket`.
    pub fn new(bucket: Url) -> Self {
        Self {
            bucket,
            objects: Arc::default(),
        }
    }

    /// Stored object at `path`.
    pub fn object(&self, path: &str) -> Option<AvatarUpload> {
        lock(&self.objects).stored.get(path).cloned()
    }

    /// Make every later upload fail until switched back.
    pub fn reject_uploads(&self, rejecting: bool) {
        lock(&self.objects).rejecting = rejecting;
    }
}

impl Default for InMemoryAvatarStorage {
    fn default() -> Self {
        let bucket = Url::parse(DEFAULT_BUCKET_URL)
            .unwrap_or_else(|err| panic!("default bucket url is invalid: {err}"));
        Self::new(bucket)
    }
}

#[async_trait]
impl AvatarStorage for InMemoryAvatarStorage {
    async fn upload(
        &self,
        object_path: &str,
        upload: &AvatarUpload,
    ) -> Result<Url, AvatarStorageError> {
        let url = self
            .bucket
            .join(object_path)
            .map_err(|err| AvatarStorageError::download_url(err.to_string()))?;
        {
            let mut objects = lock(&self.objects);
            if objects.rejecting {
                return Err(AvatarStorageError::upload("storage rejected the object"));
            }
            objects.stored.insert(object_path.to_owned(), upload.clone());
        }
        debug!(
            object_path,
            bytes = upload.bytes.len(),
            content_type = upload.content_type.as_str(),
            "avatar stored"
        );
        Ok(url)
    }
}
