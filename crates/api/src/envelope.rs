//! # リクエスト / レスポンス エンベロープ
//!
//! APIゲートウェイのプロキシイベントに対応する入出力。
//! HTTPサーバー（`routes`）とLambdaランタイム（`lambda`）の両方がこの形に変換してからハンドラを呼ぶ。
//! ハンドラはトランスポートの詳細を知らない。

use std::collections::{BTreeMap, HashMap};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use base64::Engine;
use photo_types::ErrorBody;
use serde::Serialize;

use crate::error::PhotoError;

/// Base64エンジン（Standard）
pub(crate) fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// ハンドラへの入力。
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// リクエストボディ（テキスト、または `is_base64_encoded` の場合Base64）
    pub body: Option<String>,
    pub path_parameters: Option<HashMap<String, String>>,
    /// ボディがBase64エンコードされているか
    pub is_base64_encoded: bool,
}

impl ApiRequest {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// 生のボディバイト列から構築する。
    ///
    /// UTF-8でなければゲートウェイのバイナリボディと同じくBase64で保持し、
    /// テキスト化の判定は `body_text` に任せる。
    pub fn from_body_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::with_body(text),
            Err(e) => Self {
                body: Some(b64().encode(e.into_bytes())),
                is_base64_encoded: true,
                ..Self::default()
            },
        }
    }

    pub fn with_path_parameter(name: &str, value: impl Into<String>) -> Self {
        Self {
            path_parameters: Some(HashMap::from([(name.to_string(), value.into())])),
            ..Self::default()
        }
    }

    /// ボディをテキストとして取り出す。空文字列は欠落として扱う。
    pub fn body_text(&self) -> Result<Option<String>, PhotoError> {
        let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        if !self.is_base64_encoded {
            return Ok(Some(body.to_string()));
        }
        let text = b64()
            .decode(body)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| {
                PhotoError::InvalidRequest("Invalid request body encoding".to_string())
            })?;
        Ok(Some(text).filter(|t| !t.is_empty()))
    }

    /// 空でないパスパラメータを取り出す。
    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()?
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// ハンドラの出力。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    /// JSONボディのレスポンスを構築する。
    ///
    /// シリアライズに失敗した場合は固定文言の500を返す。
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::new(status, body),
            Err(e) => {
                tracing::error!(error = %e, "レスポンスのシリアライズに失敗");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"error":"Internal server error"}"#.to_string(),
                )
            }
        }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(
            status,
            &ErrorBody {
                error: message.to_string(),
            },
        )
    }

    fn new(status: StatusCode, body: String) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);
        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}
