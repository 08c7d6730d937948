//! # Photo API
//!
//! 画像のアップロードと、期限付きダウンロードURLの発行を行うAPIサーバー。
//!
//! ## 役割
//! - 画像をBlobストア（S3互換）へ保存
//! - メタデータをメタデータストアへ保存
//! - 保存済み画像の署名付きURL発行
//!
//! ## API エンドポイント
//! - `POST /photos` — 写真アップロード
//! - `GET /photos/{photoId}` — メタデータと署名付きURLの取得
//!
//! `AWS_LAMBDA_RUNTIME_API` が設定されている場合はHTTPサーバーの代わりに
//! Lambdaランタイムとして起動し、APIゲートウェイのプロキシイベントを処理する。

mod config;
mod content_type;
mod envelope;
mod error;
mod handlers;
#[cfg(feature = "lambda")]
mod lambda;
mod metadata;
mod routes;
mod storage;

use std::sync::Arc;

use config::{AppState, PhotoConfig};
use handlers::{RetrievalHandler, UploadHandler};
use metadata::MetadataStore;
use storage::BlobStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = PhotoConfig::from_env()?;
    tracing::info!(
        bucket = %config.bucket_name,
        metadata_bucket = %config.metadata_bucket_name,
        table = %config.table_name,
        url_expiration_secs = config.url_expiration_secs,
        "設定を読み込みました"
    );

    // ストアのハンドルはプロセス起動時に一度だけ構築し、両ハンドラで共有する
    let (blobs, records) = build_stores(&config)?;

    let state = Arc::new(AppState {
        upload: UploadHandler::new(blobs.clone(), records.clone(), config.max_upload_bytes),
        retrieval: RetrievalHandler::new(blobs, records, config.url_expiration_secs),
    });

    #[cfg(feature = "lambda")]
    if std::env::var_os(lambda::RUNTIME_API_ENV).is_some() {
        tracing::info!("Lambdaランタイムとして起動します");
        return lambda::run(state).await.map_err(|e| anyhow::anyhow!(e));
    }

    let app = routes::router(state);

    tracing::info!("Photo APIを {} で起動します", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "vendor-aws")]
fn build_stores(
    config: &PhotoConfig,
) -> anyhow::Result<(Arc<dyn BlobStore>, Arc<dyn MetadataStore>)> {
    if let Some(endpoint) = &config.s3.endpoint {
        tracing::info!(s3_endpoint = %endpoint, "S3互換エンドポイントを設定");
    }
    let blobs = storage::S3BlobStore::from_settings(&config.s3, &config.bucket_name)?;
    let records = metadata::S3MetadataStore::from_settings(
        &config.s3,
        &config.metadata_bucket_name,
        &config.table_name,
    )?;
    Ok((Arc::new(blobs), Arc::new(records)))
}

#[cfg(not(feature = "vendor-aws"))]
fn build_stores(
    _config: &PhotoConfig,
) -> anyhow::Result<(Arc<dyn BlobStore>, Arc<dyn MetadataStore>)> {
    anyhow::bail!("ストア実装が有効になっていません（vendor-aws featureを有効にしてください）")
}
