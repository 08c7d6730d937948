//! # Photo API エラー型
//!
//! ハンドラ共通のエラー分類と、コラボレータ（Blob/メタデータストア）のエラー型。
//! レスポンスへの変換はハンドラごとに1箇所（`handle`）で行う。

use axum::http::StatusCode;

use crate::envelope::ApiResponse;

/// ハンドラのエラー分類。
///
/// 各バリアントは内部原因（ログ用）を保持する。
/// クライアントに返すのは `public_message` のみ。
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    /// 入力不備（ボディ欠落、必須フィールド欠落、パース失敗）
    #[error("不正なリクエスト: {0}")]
    InvalidRequest(String),
    /// Base64デコード失敗
    #[error("画像データのデコードに失敗: {0}")]
    DecodeFailure(String),
    /// ボディが受信上限を超えた
    #[error("リクエストボディが大きすぎます: {0}")]
    PayloadTooLarge(String),
    /// 対応していないHTTPメソッド
    #[error("未対応のメソッド: {0}")]
    MethodNotAllowed(String),
    /// 指定IDのレコードが存在しない
    #[error("写真が見つかりません: {0}")]
    NotFound(String),
    /// Blobストアへの書き込み失敗
    #[error("ストレージへの書き込みに失敗: {0}")]
    StorageWriteFailure(String),
    /// メタデータストアへの書き込み失敗
    #[error("メタデータの書き込みに失敗: {0}")]
    MetadataWriteFailure(String),
    /// メタデータストアからの読み込み失敗
    #[error("メタデータの読み込みに失敗: {0}")]
    MetadataReadFailure(String),
    /// 署名付きURL生成失敗
    #[error("署名付きURL生成に失敗: {0}")]
    SigningFailure(String),
    /// 想定外のエラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl PhotoError {
    pub fn status(&self) -> StatusCode {
        match self {
            PhotoError::InvalidRequest(_) | PhotoError::DecodeFailure(_) => {
                StatusCode::BAD_REQUEST
            }
            PhotoError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            PhotoError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            PhotoError::NotFound(_) => StatusCode::NOT_FOUND,
            PhotoError::StorageWriteFailure(_)
            | PhotoError::MetadataWriteFailure(_)
            | PhotoError::MetadataReadFailure(_)
            | PhotoError::SigningFailure(_)
            | PhotoError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// クライアント向けのメッセージ。
    ///
    /// 4xxは入力に関する説明をそのまま返し、5xxは固定文言のみ返す。
    /// コラボレータの生エラーはここに含めない。
    pub fn public_message(&self) -> String {
        match self {
            PhotoError::InvalidRequest(msg) => msg.clone(),
            PhotoError::DecodeFailure(_) => "Invalid base64 image data".to_string(),
            PhotoError::PayloadTooLarge(_) => "Image exceeds maximum upload size".to_string(),
            PhotoError::MethodNotAllowed(_) => "Method not allowed".to_string(),
            PhotoError::NotFound(photo_id) => format!("Photo with ID {photo_id} not found"),
            PhotoError::StorageWriteFailure(_) => "Failed to store photo".to_string(),
            PhotoError::MetadataWriteFailure(_) => "Failed to store photo metadata".to_string(),
            PhotoError::MetadataReadFailure(_) => "Failed to read photo metadata".to_string(),
            PhotoError::SigningFailure(_) => "Failed to generate download URL".to_string(),
            PhotoError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// エラーをログに記録し、エンベロープ形式のレスポンスに変換する。
    pub fn into_api_response(self) -> ApiResponse {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "リクエスト処理に失敗");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "リクエストを拒否");
        }
        ApiResponse::error(status, &self.public_message())
    }
}

/// Blobストア・メタデータストアのエラー型。
///
/// ハンドラで `PhotoError` に写像され、レスポンスには現れない。
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 通信・SDKレベルの失敗
    #[error("ストアへのリクエストに失敗: {0}")]
    Request(String),
    /// ストアが想定外のステータスを返した
    #[error("ストアがエラーを返しました: HTTP {status} ({key})")]
    Status { status: u16, key: String },
    /// レコードのシリアライズ・デシリアライズ失敗
    #[error("レコードの変換に失敗: {0}")]
    Codec(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 各バリアントが対応するHTTPステータスに写像されることを確認
    #[test]
    fn test_status_mapping() {
        let cases = [
            (PhotoError::InvalidRequest("x".into()), 400),
            (PhotoError::DecodeFailure("x".into()), 400),
            (PhotoError::PayloadTooLarge("x".into()), 413),
            (PhotoError::MethodNotAllowed("x".into()), 405),
            (PhotoError::NotFound("x".into()), 404),
            (PhotoError::StorageWriteFailure("x".into()), 500),
            (PhotoError::MetadataWriteFailure("x".into()), 500),
            (PhotoError::MetadataReadFailure("x".into()), 500),
            (PhotoError::SigningFailure("x".into()), 500),
            (PhotoError::Internal("x".into()), 500),
        ];
        for (error, expected) in cases {
            assert_eq!(error.status().as_u16(), expected, "{error}");
        }
    }

    /// 5xxの公開メッセージに内部原因が含まれないことを確認
    #[test]
    fn test_public_message_hides_cause() {
        let error = PhotoError::StorageWriteFailure("secret-endpoint:9000 refused".into());
        assert_eq!(error.public_message(), "Failed to store photo");

        let error = PhotoError::Internal("panic in codec".into());
        assert!(!error.public_message().contains("codec"));
    }

    /// NotFoundのメッセージにIDが含まれることを確認
    #[test]
    fn test_not_found_message() {
        let error = PhotoError::NotFound("nonexistent-id".into());
        assert_eq!(error.public_message(), "Photo with ID nonexistent-id not found");
    }
}
