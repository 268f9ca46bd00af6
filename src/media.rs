use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    config::{self, Credentials},
    Client,
};

use crate::configuration::MediaSettings;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Failed to delete media object {key}: {message}")]
    Delete { key: String, message: String },
}

/// Object storage holding uploaded posters, covers and videos. The service
/// never uploads; it only removes objects that belong to deleted or replaced
/// media.
#[derive(Clone, Debug)]
pub struct MediaStore {
    client: Option<Client>,
    bucket: String,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(settings: &MediaSettings) -> Self {
        if !settings.enabled {
            tracing::info!("Media store disabled, uploaded objects will not be removed");
            return MediaStore::disabled(&settings.public_base_url);
        }
        let credentials = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            "loaded from configuration",
        );
        let mut builder = config::Builder::new()
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .behavior_version(BehaviorVersion::latest());
        if !settings.endpoint_url.is_empty() {
            builder = builder
                .endpoint_url(settings.endpoint_url.clone())
                .force_path_style(true);
        }
        MediaStore {
            client: Some(Client::from_conf(builder.build())),
            bucket: settings.bucket.clone(),
            public_base_url: settings.public_base_url.clone(),
        }
    }

    pub fn disabled(public_base_url: &str) -> Self {
        MediaStore {
            client: None,
            bucket: String::new(),
            public_base_url: public_base_url.to_string(),
        }
    }

    /// Object key for a URL served from this store, `None` for anything
    /// hosted elsewhere (external trailers, third-party posters).
    pub fn object_key(&self, url: &str) -> Option<String> {
        let base = self.public_base_url.trim_end_matches('/');
        if base.is_empty() {
            return None;
        }
        let key = url.strip_prefix(base)?.strip_prefix('/')?;
        let key = key.split(['?', '#']).next().unwrap_or_default();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    pub async fn delete(&self, url: &str) -> Result<(), MediaError> {
        let (client, key) = match (&self.client, self.object_key(url)) {
            (Some(client), Some(key)) => (client, key),
            _ => {
                tracing::debug!("Not removing {}, not a stored object", url);
                return Ok(());
            }
        };
        client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|err| MediaError::Delete {
                key: key.clone(),
                message: err.to_string(),
            })?;
        tracing::info!("Removed media object {}", key);
        Ok(())
    }

    /// Removes every URL, logging failures instead of stopping.
    pub async fn delete_all<'a, I>(&self, urls: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for url in urls {
            if let Err(err) = self.delete(url).await {
                tracing::error!("{}", err);
            }
        }
    }
}
