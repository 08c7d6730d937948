//! # S3互換 Blobストア実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIを使用するBlobストア実装。
//! バケット初期化はメタデータストア（`metadata::s3`）と共有する。

use super::BlobStore;
use crate::config::S3Settings;
use crate::error::StoreError;

/// S3互換バケットを初期化する。
///
/// エンドポイント指定時はパススタイル（MinIO等）、未指定時はAWSのリージョンエンドポイントを使う。
/// アクセスキー未指定時は環境の認証情報（環境変数・プロファイル・インスタンスロール）を使う。
pub fn init_bucket(settings: &S3Settings, bucket_name: &str) -> anyhow::Result<s3::Bucket> {
    let credentials = match (&settings.access_key, &settings.secret_key) {
        (Some(access_key), Some(secret_key)) => s3::creds::Credentials::new(
            Some(access_key.as_str()),
            Some(secret_key.as_str()),
            None,
            None,
            None,
        )?,
        _ => s3::creds::Credentials::default()?,
    };

    let bucket = match &settings.endpoint {
        Some(endpoint) => {
            let region = s3::Region::Custom {
                region: settings.region_for_endpoint(endpoint),
                endpoint: endpoint.clone(),
            };
            s3::Bucket::new(bucket_name, region, credentials)?.with_path_style()
        }
        None => {
            let region: s3::Region = settings
                .region
                .as_deref()
                .unwrap_or(S3Settings::DEFAULT_REGION)
                .parse()?;
            s3::Bucket::new(bucket_name, region, credentials)?
        }
    };

    Ok(*bucket)
}

/// S3互換ストレージによるBlobストア実装。
pub struct S3BlobStore {
    bucket: s3::Bucket,
}

impl S3BlobStore {
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// 設定からバケットを初期化して構築する。
    pub fn from_settings(settings: &S3Settings, bucket_name: &str) -> anyhow::Result<Self> {
        Ok(Self::new(init_bucket(settings, bucket_name)?))
    }
}

#[async_trait::async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, bytes, content_type)
            .await
            .map_err(|e| StoreError::Request(format!("PUT {key}: {e}")))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StoreError::Status {
                status,
                key: key.to_string(),
            });
        }
        Ok(())
    }

    async fn sign(&self, key: &str, expiry_secs: u32) -> Result<String, StoreError> {
        self.bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(|e| StoreError::Request(format!("署名付きダウンロードURL生成失敗: {e}")))
    }
}
