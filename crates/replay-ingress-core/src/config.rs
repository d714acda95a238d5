//! Configuration module
//!
//! Configuration is read from the environment (a `.env` file is honoured via
//! `dotenvy`) and validated once at startup.

use std::env;

use crate::constants::{DEFAULT_GCS_BUCKET, DEFAULT_MAX_UPLOAD_SIZE_BYTES};
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8080;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    /// `compact` or `json`
    pub log_format: String,
    /// Number of reverse proxies whose `X-Forwarded-For` entries are trusted. 0 = use the socket peer.
    pub trusted_proxy_count: usize,
}

/// Storage and upload settings
#[derive(Clone, Debug)]
pub struct IngressConfig {
    pub base: BaseConfig,
    pub storage_backend: StorageBackend,
    pub gcs_bucket: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub max_upload_size_bytes: usize,
    /// Build the storage client during startup instead of on the first request.
    pub storage_eager_init: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IngressConfig>);

impl Config {
    fn as_ingress(&self) -> &IngressConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = IngressConfig::from_source(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_ingress().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment().to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.as_ingress().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_ingress().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_ingress().base.log_format
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.as_ingress().base.trusted_proxy_count
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_ingress().storage_backend
    }

    pub fn gcs_bucket(&self) -> &str {
        &self.as_ingress().gcs_bucket
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_ingress().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_ingress().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_ingress().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_ingress().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_ingress().local_storage_path.as_deref()
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_ingress().max_upload_size_bytes
    }

    pub fn storage_eager_init(&self) -> bool {
        self.as_ingress().storage_eager_init
    }
}

impl IngressConfig {
    fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "compact".to_string())
                .to_lowercase(),
            trusted_proxy_count: lookup("TRUSTED_PROXY_COUNT")
                .map(|s| {
                    s.trim().parse::<usize>().map_err(|_| {
                        anyhow::anyhow!("TRUSTED_PROXY_COUNT must be a non-negative number")
                    })
                })
                .transpose()?
                .unwrap_or(0),
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Gcs,
        };

        let max_upload_size_bytes = lookup("MAX_UPLOAD_SIZE_BYTES")
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_BYTES must be a valid number"))
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_BYTES);

        let config = IngressConfig {
            base,
            storage_backend,
            gcs_bucket: lookup("GCS_BUCKET").unwrap_or_else(|| DEFAULT_GCS_BUCKET.to_string()),
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            max_upload_size_bytes,
            storage_eager_init: lookup("STORAGE_EAGER_INIT")
                .map(|s| {
                    s.trim().to_lowercase().parse::<bool>().map_err(|_| {
                        anyhow::anyhow!("STORAGE_EAGER_INIT must be 'true' or 'false'")
                    })
                })
                .transpose()?
                .unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_BYTES must be greater than zero"
            ));
        }

        if !matches!(self.base.log_format.as_str(), "compact" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'compact' or 'json'"));
        }

        match self.storage_backend {
            StorageBackend::Gcs => {
                if self.gcs_bucket.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "GCS_BUCKET must not be empty when using GCS storage backend"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }
}
