//! # メタデータストア
//!
//! `PhotoRecord` を `photoId` をキーとして保存・取得するキーバリューストアの抽象インターフェース。
//! S3互換ストレージ上のJSONオブジェクトによる実装は `s3` サブモジュールを参照。

#[cfg(feature = "vendor-aws")]
pub mod s3;

#[cfg(feature = "vendor-aws")]
pub use s3::S3MetadataStore;

use photo_types::PhotoRecord;

use crate::error::StoreError;

/// メタデータストアの抽象インターフェース。
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// `photo_id` のレコードを取得する。存在しない場合は `Ok(None)`。
    async fn get(&self, photo_id: &str) -> Result<Option<PhotoRecord>, StoreError>;

    /// レコードを保存する。
    async fn put(&self, record: &PhotoRecord) -> Result<(), StoreError>;
}
