//! S3 storage service for archived upload files.
//!
//! Every accepted spreadsheet is archived to object storage before any rows
//! are inserted. Supports both AWS S3 and MinIO for development.

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use tracing::info;
use uuid::Uuid;

use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    /// Create a new S3 storage client from configuration.
    pub async fn new(config: &StorageSettings) -> AppResult<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "repotrack",
        );

        let region = Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        // Use custom endpoint for MinIO in development
        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let s3_config = s3_config_builder.build();
        let client = Client::from_conf(s3_config);

        let storage = Self {
            client,
            bucket: config.bucket.clone(),
        };

        // Verify bucket exists or create it
        storage.ensure_bucket_exists().await?;

        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(storage)
    }

    /// Ensure the bucket exists, creating it if necessary.
    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("S3 bucket '{}' exists", self.bucket);
                Ok(())
            }
            Err(e) => {
                // Check if it's a "not found" error
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    info!("Creating S3 bucket '{}'", self.bucket);
                    self.client
                        .create_bucket()
                        .bucket(&self.bucket)
                        .send()
                        .await
                        .map_err(|e| {
                            AppError::Storage(format!("Failed to create bucket: {}", e))
                        })?;
                    info!("S3 bucket '{}' created", self.bucket);
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )))
                }
            }
        }
    }

    /// Get the content type for an uploaded file based on its extension.
    pub fn content_type_for_extension(ext: &str) -> &'static str {
        match ext.to_lowercase().as_str() {
            "csv" => "text/csv",
            "tsv" | "tab" => "text/tab-separated-values",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    /// Upload a file to S3.
    ///
    /// # Arguments
    /// * `key` - The S3 object key where the file will be uploaded
    /// * `data` - The file contents as bytes
    /// * `content_type` - Optional content type for the upload
    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file to S3: {}", e)))?;

        Ok(())
    }

    /// Build the archive key for an uploaded spreadsheet.
    ///
    /// # Arguments
    /// * `tenant_id` - The owning tenant UUID
    /// * `batch_id` - The batch UUID assigned to the upload
    /// * `file_name` - The original filename
    ///
    /// # Returns
    /// S3 key in format: uploads/{tenant_id}/{batch_id}/{file_name}
    pub fn upload_key(tenant_id: Uuid, batch_id: Uuid, file_name: &str) -> String {
        format!("uploads/{}/{}/{}", tenant_id, batch_id, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key() {
        let tenant = Uuid::parse_str("0193e0d0-0000-7000-8000-000000000001").unwrap();
        let batch = Uuid::parse_str("0193e0d0-0000-7000-8000-000000000002").unwrap();
        let key = Storage::upload_key(tenant, batch, "fleet.csv");
        assert_eq!(
            key,
            "uploads/0193e0d0-0000-7000-8000-000000000001/0193e0d0-0000-7000-8000-000000000002/fleet.csv"
        );
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(Storage::content_type_for_extension("csv"), "text/csv");
        assert_eq!(Storage::content_type_for_extension("CSV"), "text/csv");
        assert_eq!(
            Storage::content_type_for_extension("tsv"),
            "text/tab-separated-values"
        );
        assert_eq!(Storage::content_type_for_extension("txt"), "text/plain");
        assert_eq!(
            Storage::content_type_for_extension("unknown"),
            "application/octet-stream"
        );
    }
}
