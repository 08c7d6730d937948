//! # Lambdaエントリポイント
//!
//! APIゲートウェイのプロキシイベントをエンベロープに変換し、HTTPサーバーと同じハンドラへ渡す。
//! ルーティングはゲートウェイ側で行われるため、ここではメソッドだけを見る。
//!
//! - `POST` — 写真アップロード
//! - `GET` — 写真取得（`pathParameters.photoId`）

use std::collections::HashMap;
use std::sync::Arc;

use lambda_http::http::Method;
use lambda_http::{service_fn, Body, Error, Request, RequestExt, Response};

use crate::config::AppState;
use crate::envelope::{ApiRequest, ApiResponse};
use crate::error::PhotoError;
use crate::handlers::retrieve::PHOTO_ID_PARAM;

/// Lambdaランタイムが設定する環境変数。存在すればLambdaとして起動する。
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

/// Lambdaランタイムのイベントループを開始する。
pub async fn run(state: Arc<AppState>) -> Result<(), Error> {
    lambda_http::run(service_fn(move |request: Request| {
        let state = state.clone();
        async move { handle_event(&state, request).await }
    }))
    .await
}

/// プロキシイベント1件を処理する。
pub async fn handle_event(state: &AppState, request: Request) -> Result<Response<Body>, Error> {
    let api_request = to_api_request(&request);
    let response = match *request.method() {
        Method::POST => state.upload.handle(&api_request).await,
        Method::GET => state.retrieval.handle(&api_request).await,
        ref method => PhotoError::MethodNotAllowed(method.to_string()).into_api_response(),
    };
    to_lambda_response(response)
}

fn to_api_request(request: &Request) -> ApiRequest {
    let mut api_request = match request.body() {
        Body::Empty => ApiRequest::default(),
        Body::Text(text) => ApiRequest::with_body(text.clone()),
        // isBase64Encoded のボディはランタイムが復号済み
        Body::Binary(bytes) => ApiRequest::from_body_bytes(bytes.clone()),
    };
    api_request.path_parameters = request
        .path_parameters_ref()
        .and_then(|params| params.first(PHOTO_ID_PARAM))
        .map(|photo_id| HashMap::from([(PHOTO_ID_PARAM.to_string(), photo_id.to_string())]));
    api_request
}

fn to_lambda_response(response: ApiResponse) -> Result<Response<Body>, Error> {
    let mut builder = Response::builder().status(response.status_code);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    Ok(builder.body(Body::Text(response.body))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_helpers::*;

    fn state(blobs: &Arc<MockBlobStore>, records: &Arc<MockMetadataStore>) -> AppState {
        AppState {
            upload: upload_handler(blobs, records),
            retrieval: retrieval_handler(blobs, records),
        }
    }

    fn event(method: &str, body: Body) -> Request {
        lambda_http::http::Request::builder()
            .method(method)
            .uri("/photos")
            .body(body)
            .unwrap()
    }

    fn response_json(response: &Response<Body>) -> serde_json::Value {
        match response.body() {
            Body::Text(text) => body_json(text),
            other => panic!("テキストボディではない: {other:?}"),
        }
    }

    /// POSTイベントでアップロードし、GETイベントで同じレコードを取得できることを確認
    #[tokio::test]
    async fn test_lambda_upload_then_get() {
        let blobs = Arc::new(MockBlobStore::default());
        let records = Arc::new(MockMetadataStore::default());
        let state = state(&blobs, &records);

        let body = serde_json::json!({ "fileName": "cat.png", "image": "aGVsbG8=" }).to_string();
        let response = handle_event(&state, event("POST", Body::Text(body)))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let uploaded = response_json(&response);
        let photo_id = uploaded["photoId"].as_str().unwrap().to_string();

        let request = event("GET", Body::Empty).with_path_parameters(HashMap::from([(
            PHOTO_ID_PARAM.to_string(),
            photo_id.clone(),
        )]));
        let response = handle_event(&state, request).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body = response_json(&response);
        assert_eq!(body["photoId"], photo_id.as_str());
        assert_eq!(body["storageKey"], uploaded["storageKey"]);
        assert_eq!(blobs.sign_count(), 1);
    }

    /// バイナリ（Base64エンコード）ボディのイベントも処理できることを確認
    #[tokio::test]
    async fn test_lambda_binary_body() {
        let blobs = Arc::new(MockBlobStore::default());
        let records = Arc::new(MockMetadataStore::default());
        let state = state(&blobs, &records);

        let body = br#"{"fileName":"cat.png","image":"aGVsbG8="}"#.to_vec();
        let response = handle_event(&state, event("POST", Body::Binary(body)))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);

        let response = handle_event(&state, event("POST", Body::Binary(vec![0xff, 0xfe])))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        assert_eq!(
            response_json(&response)["error"],
            "Invalid request body encoding"
        );
        assert_eq!(blobs.put_count(), 1);
    }

    /// photoIdのないGETは400、未対応メソッドは405となることを確認
    #[tokio::test]
    async fn test_lambda_error_responses() {
        let blobs = Arc::new(MockBlobStore::default());
        let records = Arc::new(MockMetadataStore::default());
        let state = state(&blobs, &records);

        let response = handle_event(&state, event("GET", Body::Empty))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        assert_eq!(response_json(&response)["error"], "Missing photoId parameter");

        let response = handle_event(&state, event("DELETE", Body::Empty))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 405);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response_json(&response)["error"], "Method not allowed");

        assert_eq!(records.get_count(), 0);
        assert_eq!(blobs.put_count(), 0);
    }
}
