//! # S3互換 メタデータストア実装
//!
//! レコードを `<table>/<photoId>.json` のJSONオブジェクトとして保存する。
//! テーブル名はオブジェクトキーの接頭辞として使う。

use photo_types::PhotoRecord;

use super::MetadataStore;
use crate::config::S3Settings;
use crate::error::StoreError;
use crate::storage::s3::init_bucket;

/// S3互換ストレージによるメタデータストア実装。
pub struct S3MetadataStore {
    bucket: s3::Bucket,
    table: String,
}

impl S3MetadataStore {
    pub fn new(bucket: s3::Bucket, table: impl Into<String>) -> Self {
        Self {
            bucket,
            table: table.into(),
        }
    }

    pub fn from_settings(
        settings: &S3Settings,
        bucket_name: &str,
        table: &str,
    ) -> anyhow::Result<Self> {
        Ok(Self::new(init_bucket(settings, bucket_name)?, table))
    }

    fn record_key(&self, photo_id: &str) -> String {
        format!("{}/{}.json", self.table, photo_id)
    }
}

#[async_trait::async_trait]
impl MetadataStore for S3MetadataStore {
    async fn get(&self, photo_id: &str) -> Result<Option<PhotoRecord>, StoreError> {
        let key = self.record_key(photo_id);
        let response = self
            .bucket
            .get_object(&key)
            .await
            .map_err(|e| StoreError::Request(format!("GET {key}: {e}")))?;

        // rust-s3 は fail-on-err 無効でビルドしており、404もOkのステータスとして返る
        match response.status_code() {
            404 => Ok(None),
            200..=299 => serde_json::from_slice(response.as_slice())
                .map(Some)
                .map_err(|e| StoreError::Codec(format!("{key}: {e}"))),
            status => Err(StoreError::Status { status, key }),
        }
    }

    async fn put(&self, record: &PhotoRecord) -> Result<(), StoreError> {
        let key = self.record_key(&record.photo_id);
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Codec(e.to_string()))?;

        let response = self
            .bucket
            .put_object_with_content_type(&key, &bytes, "application/json")
            .await
            .map_err(|e| StoreError::Request(format!("PUT {key}: {e}")))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StoreError::Status { status, key });
        }
        Ok(())
    }
}
