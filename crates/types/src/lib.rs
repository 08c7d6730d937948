//! # Photo API 共有型定義
//!
//! アップロード・取得ハンドラとメタデータストアで共有するデータ構造。
//!
//! ## エンコーディング規則
//! - JSONフィールド名はcamelCase（`photoId`, `fileName` 等）
//! - `uploadTimestamp` はUNIXエポック秒の整数

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 永続化レコード
// ---------------------------------------------------------------------------

/// メタデータストアに保存される唯一のエンティティ。
///
/// 作成後は不変。`storage_key` は `photo_id` と `file_name` から一意に決まる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// UUID v4の文字列表現（メタデータストアの主キー）
    pub photo_id: String,
    /// クライアントが指定したファイル名
    pub file_name: String,
    /// アップロード時刻（UNIXエポック秒）
    pub upload_timestamp: u64,
    /// Blobストア上のオブジェクトキー (`photos/<photoId>/<fileName>`)
    pub storage_key: String,
}

// ---------------------------------------------------------------------------
// リクエスト / レスポンス
// ---------------------------------------------------------------------------

/// アップロードリクエストのボディ。
///
/// 必須チェックはハンドラ側で行うため、両フィールドともOptionで受ける。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPhotoRequest {
    /// 保存するファイル名
    #[serde(default)]
    pub file_name: Option<String>,
    /// Base64ペイロード（`data:<mime>;base64,` ヘッダ付きも可）
    #[serde(default)]
    pub image: Option<String>,
}

/// 取得レスポンス。レコードの全フィールドに署名付きURLを加えたもの。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoWithUrl {
    #[serde(flatten)]
    pub record: PhotoRecord,
    /// 期限付きダウンロードURL（GET）
    pub download_url: String,
}

/// エラーレスポンスのボディ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
