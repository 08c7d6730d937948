//! # 写真取得
//!
//! ## 処理フロー
//! 1. パスパラメータ `photoId` を検証（英数字・`-`・`_` のみ許可）
//! 2. メタデータストアからレコードを取得（存在しなければ404）
//! 3. レコードの `storageKey` に対する署名付きURLを発行
//!
//! どちらのストアも読み取りのみ。


use std::sync::Arc;

use axum::http::StatusCode;
use photo_types::PhotoWithUrl;

use crate::envelope::{ApiRequest, ApiResponse};
use crate::error::PhotoError;
use crate::metadata::MetadataStore;
use crate::storage::BlobStore;

/// パスパラメータ名
pub const PHOTO_ID_PARAM: &str = "photoId";

/// 写真取得ハンドラ。
pub struct RetrievalHandler {
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn MetadataStore>,
    /// 署名付きURLの有効期限（秒）
    url_expiration_secs: u32,
}

impl RetrievalHandler {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn MetadataStore>,
        url_expiration_secs: u32,
    ) -> Self {
        Self {
            blobs,
            records,
            url_expiration_secs,
        }
    }

    /// リクエストを処理する。失敗はここでレスポンスに変換される。
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        match self.retrieve(request).await {
            Ok(photo) => ApiResponse::json(StatusCode::OK, &photo),
            Err(e) => e.into_api_response(),
        }
    }

    async fn retrieve(&self, request: &ApiRequest) -> Result<PhotoWithUrl, PhotoError> {
        let photo_id = request
            .path_parameter(PHOTO_ID_PARAM)
            .ok_or_else(|| PhotoError::InvalidRequest("Missing photoId parameter".to_string()))?;
        if !is_valid_photo_id(photo_id) {
            return Err(PhotoError::InvalidRequest(
                "Invalid photoId parameter".to_string(),
            ));
        }

        let record = self
            .records
            .get(photo_id)
            .await
            .map_err(|e| PhotoError::MetadataReadFailure(format!("{photo_id}: {e}")))?
            .ok_or_else(|| PhotoError::NotFound(photo_id.to_string()))?;

        let download_url = self
            .blobs
            .sign(&record.storage_key, self.url_expiration_secs)
            .await
            .map_err(|e| PhotoError::SigningFailure(format!("{}: {e}", record.storage_key)))?;

        tracing::debug!(photo_id = %record.photo_id, "署名付きURLを発行しました");
        Ok(PhotoWithUrl {
            record,
            download_url,
        })
    }
}

/// photoIdはストアのキーに埋め込まれるため、区切り文字（`/`・`.` 等）を含むものは拒否する。
fn is_valid_photo_id(photo_id: &str) -> bool {
    photo_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
