//! Application configuration, read once at process start

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::Environment;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_STAGING_DIR: &str = "./public/temp";
/// 15 MiB
const DEFAULT_MAX_UPLOAD_BYTES: usize = 15_728_640;
const DEFAULT_IMAGE_RECORDS_TABLE: &str = "image-records";
const DEFAULT_CLOUDINARY_API_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_DEV_S3_BUCKET: &str = "image-uploads";

/// Errors raised while reading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    /// A variable is set to a value that cannot be used
    #[error("{name} has an invalid value: {value}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Credentials and endpoint of the Cloudinary upload API
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    /// Account (cloud) name
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret used to sign upload requests
    pub api_secret: String,
    /// Base URL of the upload API
    pub api_base_url: String,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Bucket used when media is hosted on S3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3MediaConfig {
    /// Bucket receiving the uploads
    pub bucket_name: String,
    /// Prefix of the public URL of every uploaded object
    pub public_base_url: String,
}

/// Which media host receives staged uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaHostConfig {
    /// Cloudinary signed upload API
    Cloudinary(CloudinaryConfig),
    /// S3-compatible bucket with public objects
    S3(S3MediaConfig),
}

/// Configuration shared by every component of the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment stage
    pub environment: Environment,
    /// HTTP listen port
    pub port: u16,
    /// Directory receiving staged uploads
    pub staging_dir: PathBuf,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Dynamo DB table holding image records
    pub image_records_table: String,
    /// Media host settings
    pub media_host: MediaHostConfig,
}

impl AppConfig {
    /// Reads the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or malformed
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        Self::from_lookup(environment, |name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`; blank values count as unset
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or malformed
    pub fn from_lookup<F>(environment: Environment, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let port = parse_or(var("PORT"), "PORT", DEFAULT_PORT)?;
        let max_upload_bytes = parse_or(
            var("MAX_UPLOAD_BYTES"),
            "MAX_UPLOAD_BYTES",
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        if max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_UPLOAD_BYTES",
                value: "0".to_string(),
            });
        }

        let staging_dir = var("STAGING_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR), PathBuf::from);
        let image_records_table =
            var("IMAGE_RECORDS_TABLE").unwrap_or_else(|| DEFAULT_IMAGE_RECORDS_TABLE.to_string());

        let media_host = match var("MEDIA_HOST")
            .map(|value| value.to_lowercase())
            .as_deref()
        {
            None | Some("cloudinary") => MediaHostConfig::Cloudinary(CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
                api_base_url: var("CLOUDINARY_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE_URL.to_string()),
            }),
            Some("s3") => {
                let bucket_name = match environment {
                    Environment::Production | Environment::Staging => required("S3_BUCKET_NAME")?,
                    Environment::Development => {
                        var("S3_BUCKET_NAME").unwrap_or_else(|| DEFAULT_DEV_S3_BUCKET.to_string())
                    }
                };
                let public_base_url = var("MEDIA_PUBLIC_BASE_URL")
                    .unwrap_or_else(|| environment.default_public_base_url(&bucket_name));

                MediaHostConfig::S3(S3MediaConfig {
                    bucket_name,
                    public_base_url,
                })
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "MEDIA_HOST",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            environment,
            port,
            staging_dir,
            max_upload_bytes,
            image_records_table,
            media_host,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    value.map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value })
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const CLOUDINARY_VARS: [(&str, &str); 3] = [
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_API_KEY", "123456"),
        ("CLOUDINARY_API_SECRET", "shh"),
    ];

    #[test]
    fn test_defaults_with_cloudinary_credentials() {
        let config = AppConfig::from_lookup(Environment::Development, lookup(&CLOUDINARY_VARS))
            .expect("config should load");

        assert_eq!(config.port, 5000);
        assert_eq!(config.staging_dir, PathBuf::from("./public/temp"));
        assert_eq!(config.max_upload_bytes, 15_728_640);
        assert_eq!(config.image_records_table, "image-records");
        assert_eq!(
            config.media_host,
            MediaHostConfig::Cloudinary(CloudinaryConfig {
                cloud_name: "demo".to_string(),
                api_key: "123456".to_string(),
                api_secret: "shh".to_string(),
                api_base_url: "https://api.cloudinary.com".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_cloudinary_secret() {
        let result = AppConfig::from_lookup(
            Environment::Development,
            lookup(&[
                ("CLOUDINARY_CLOUD_NAME", "demo"),
                ("CLOUDINARY_API_KEY", "123456"),
                ("CLOUDINARY_API_SECRET", "   "),
            ]),
        );

        assert_eq!(result, Err(ConfigError::Missing("CLOUDINARY_API_SECRET")));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = CLOUDINARY_VARS.to_vec();
        vars.push(("PORT", "not-a-port"));

        let result = AppConfig::from_lookup(Environment::Development, lookup(&vars));

        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                name: "PORT",
                value: "not-a-port".to_string()
            })
        );
    }

    #[test]
    fn test_zero_upload_limit_is_rejected() {
        let mut vars = CLOUDINARY_VARS.to_vec();
        vars.push(("MAX_UPLOAD_BYTES", "0"));

        let result = AppConfig::from_lookup(Environment::Development, lookup(&vars));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "MAX_UPLOAD_BYTES",
                ..
            })
        ));
    }

    #[test]
    fn test_s3_media_host_in_development() {
        let config = AppConfig::from_lookup(
            Environment::Development,
            lookup(&[("MEDIA_HOST", "S3"), ("PORT", "8080")]),
        )
        .expect("config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.media_host,
            MediaHostConfig::S3(S3MediaConfig {
                bucket_name: "image-uploads".to_string(),
                public_base_url: "http://localhost:4566/image-uploads".to_string(),
            })
        );
    }

    #[test]
    fn test_s3_media_host_requires_bucket_in_production() {
        let result =
            AppConfig::from_lookup(Environment::Production, lookup(&[("MEDIA_HOST", "s3")]));

        assert_eq!(result, Err(ConfigError::Missing("S3_BUCKET_NAME")));
    }

    #[test]
    fn test_s3_public_base_url_override() {
        let config = AppConfig::from_lookup(
            Environment::Production,
            lookup(&[
                ("MEDIA_HOST", "s3"),
                ("S3_BUCKET_NAME", "prod-images"),
                ("MEDIA_PUBLIC_BASE_URL", "https://cdn.example.com"),
            ]),
        )
        .expect("config should load");

        assert_eq!(
            config.media_host,
            MediaHostConfig::S3(S3MediaConfig {
                bucket_name: "prod-images".to_string(),
                public_base_url: "https://cdn.example.com".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_media_host() {
        let result =
            AppConfig::from_lookup(Environment::Development, lookup(&[("MEDIA_HOST", "ftp")]));

        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                name: "MEDIA_HOST",
                value: "ftp".to_string()
            })
        );
    }

    #[test]
    fn test_debug_output_redacts_secret() {
        let config = AppConfig::from_lookup(Environment::Development, lookup(&CLOUDINARY_VARS))
            .expect("config should load");

        let debug = format!("{config:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("shh"));
    }
}
