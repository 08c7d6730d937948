//! # HTTPルーティング
//!
//! axumのリクエストをエンベロープに変換し、ハンドラへ渡す。
//!
//! ## API エンドポイント
//! - `POST /photos` — 写真アップロード
//! - `GET /photos/{photoId}` — メタデータと署名付きURLの取得
//! - `GET /photos/` — photoId欠落（400）

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use crate::config::AppState;
use crate::envelope::{ApiRequest, ApiResponse};
use crate::error::PhotoError;
use crate::handlers::retrieve::PHOTO_ID_PARAM;

/// Base64化した画像以外のJSON（`fileName`、data-URLヘッダ等）に見込む余裕
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// 画像サイズ上限から、受け付けるリクエストボディの上限を求める。
///
/// Base64は3バイトを4文字にするため、上限ちょうどの画像もボディ上限に収まる。
pub fn upload_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(BODY_LIMIT_SLACK)
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = upload_body_limit(state.upload.max_upload_bytes());
    Router::new()
        .route("/photos", post(upload_photo))
        .route("/photos/", get(get_photo_without_id))
        .route("/photos/{photoId}", get(get_photo))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// POST /photos — 写真アップロード。
///
/// ボディの読み取り失敗もJSONのエラーレスポンスとして返す。
async fn upload_photo(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResponse {
    match body {
        Ok(body) => {
            state
                .upload
                .handle(&ApiRequest::from_body_bytes(body.to_vec()))
                .await
        }
        Err(rejection) => body_rejection_error(&rejection).into_api_response(),
    }
}

fn body_rejection_error(rejection: &BytesRejection) -> PhotoError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PhotoError::PayloadTooLarge(rejection.body_text())
    } else {
        tracing::debug!(error = %rejection.body_text(), "ボディの読み取りに失敗");
        PhotoError::InvalidRequest("Invalid request body".to_string())
    }
}

/// GET /photos/{photoId} — 写真取得。
async fn get_photo(
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<String>,
) -> ApiResponse {
    state
        .retrieval
        .handle(&ApiRequest::with_path_parameter(PHOTO_ID_PARAM, photo_id))
        .await
}

async fn get_photo_without_id(State(state): State<Arc<AppState>>) -> ApiResponse {
    state.retrieval.handle(&ApiRequest::default()).await
}
