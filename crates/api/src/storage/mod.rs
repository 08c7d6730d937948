//! # Blobストア
//!
//! 画像バイト列の保存先と署名付きURL発行の抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

#[cfg(feature = "vendor-aws")]
pub mod s3;

#[cfg(feature = "vendor-aws")]
pub use s3::S3BlobStore;

use crate::error::StoreError;

/// 全ての写真オブジェクトキーの接頭辞
pub const STORAGE_KEY_PREFIX: &str = "photos";

/// Blobストア上のオブジェクトキーを導出する。
///
/// キーを組み立てるのはこの関数だけ。
pub fn storage_key(photo_id: &str, file_name: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}/{photo_id}/{file_name}")
}

/// Blobストアの抽象インターフェース。
///
/// 実装はプロセス起動時に一度だけ構築され、全リクエストで共有される。
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// `key` にバイト列を書き込む。
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;

    /// `key` を `expiry_secs` 秒間だけ取得可能な署名付きURL（GET）を生成する。
    async fn sign(&self, key: &str, expiry_secs: u32) -> Result<String, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_layout() {
        assert_eq!(storage_key("abc", "cat.png"), "photos/abc/cat.png");
        assert_eq!(
            storage_key("abc", "nested/name.jpg"),
            "photos/abc/nested/name.jpg"
        );
    }
}
