//! # 写真アップロード
//!
//! ## 処理フロー
//! 1. ボディをパースし、`fileName` と `image` の存在を検証
//! 2. data-URLヘッダ（`data:<mime>;base64,`）を除去
//! 3. Base64デコードとサイズ上限チェック
//! 4. `photoId` を生成し、`storageKey` を導出
//! 5. Blobストアへ書き込み
//! 6. メタデータを保存
//!
//! 1〜3で失敗した場合、ストアは一切呼ばれない。
//! 6で失敗した場合、5で書き込んだBlobは残る（ロールバックしない）。


use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use base64::Engine;
use photo_types::{PhotoRecord, UploadPhotoRequest};

use crate::content_type::content_type_for;
use crate::envelope::{b64, ApiRequest, ApiResponse};
use crate::error::PhotoError;
use crate::metadata::MetadataStore;
use crate::storage::{storage_key, BlobStore};

/// data-URLヘッダとペイロードの区切り
const DATA_URL_MARKER: &str = ";base64,";

/// 写真アップロードハンドラ。
pub struct UploadHandler {
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn MetadataStore>,
    max_upload_bytes: usize,
}

/// 検証済みのアップロード内容。
struct ValidatedUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl UploadHandler {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn MetadataStore>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            blobs,
            records,
            max_upload_bytes,
        }
    }

    /// デコード後の画像サイズ上限（バイト）
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// リクエストを処理する。失敗はここでレスポンスに変換される。
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        match self.upload(request).await {
            Ok(record) => ApiResponse::json(StatusCode::CREATED, &record),
            Err(e) => e.into_api_response(),
        }
    }

    async fn upload(&self, request: &ApiRequest) -> Result<PhotoRecord, PhotoError> {
        let ValidatedUpload { file_name, bytes } = self.validate(request)?;

        let photo_id = uuid::Uuid::new_v4().to_string();
        let storage_key = storage_key(&photo_id, &file_name);

        self.blobs
            .put(&storage_key, &bytes, content_type_for(&file_name))
            .await
            .map_err(|e| PhotoError::StorageWriteFailure(format!("{storage_key}: {e}")))?;

        let record = PhotoRecord {
            photo_id,
            file_name,
            upload_timestamp: now_epoch_secs()?,
            storage_key,
        };

        self.records.put(&record).await.map_err(|e| {
            // Blobは書き込み済みのまま残る
            PhotoError::MetadataWriteFailure(format!(
                "{} (孤立したBlob: {}): {e}",
                record.photo_id, record.storage_key
            ))
        })?;

        tracing::info!(
            photo_id = %record.photo_id,
            storage_key = %record.storage_key,
            size = bytes.len(),
            "写真をアップロードしました"
        );
        Ok(record)
    }

    /// ストアを呼ぶ前に行う検証・デコード。
    fn validate(&self, request: &ApiRequest) -> Result<ValidatedUpload, PhotoError> {
        let body = request
            .body_text()?
            .ok_or_else(|| PhotoError::InvalidRequest("Missing request body".to_string()))?;

        let parsed: UploadPhotoRequest = serde_json::from_str::<serde_json::Value>(&body)
            .and_then(|value| match value {
                serde_json::Value::Object(_) => serde_json::from_value(value),
                other => Err(serde::de::Error::custom(format!(
                    "JSONオブジェクトではありません: {other}"
                ))),
            })
            .map_err(|e| {
                tracing::debug!(error = %e, "ボディのパースに失敗");
                PhotoError::InvalidRequest("Invalid JSON body".to_string())
            })?;

        let (Some(file_name), Some(image)) = (
            parsed.file_name.filter(|f| !f.is_empty()),
            parsed.image.filter(|i| !i.is_empty()),
        ) else {
            return Err(PhotoError::InvalidRequest(
                "Missing required fields: image and fileName".to_string(),
            ));
        };

        let bytes = decode_image(&image)?;
        if bytes.len() > self.max_upload_bytes {
            tracing::debug!(
                size = bytes.len(),
                limit = self.max_upload_bytes,
                "画像サイズが上限を超えています"
            );
            return Err(PhotoError::InvalidRequest(
                "Image exceeds maximum upload size".to_string(),
            ));
        }

        Ok(ValidatedUpload { file_name, bytes })
    }
}

/// data-URLヘッダを除去し、Base64としてデコードする。
fn decode_image(image: &str) -> Result<Vec<u8>, PhotoError> {
    let payload = strip_data_url_header(image);
    b64()
        .decode(payload.trim())
        .map_err(|e| PhotoError::DecodeFailure(e.to_string()))
}

/// 先頭のdata-URLヘッダ（`...;base64,` まで）を取り除く。ヘッダがなければそのまま返す。
fn strip_data_url_header(image: &str) -> &str {
    match image.split_once(DATA_URL_MARKER) {
        Some((_, payload)) => payload,
        None => image,
    }
}

fn now_epoch_secs() -> Result<u64, PhotoError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| PhotoError::Internal(format!("時刻取得失敗: {e}")))
}
