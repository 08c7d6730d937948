//! # Photo API 設定・共有状態
//!
//! 環境変数からの設定読み込みと、リクエスト間で共有する状態の定義。
//! 設定はプロセス起動時に一度だけ解決する。

use anyhow::Context;

use crate::handlers::{RetrievalHandler, UploadHandler};

/// S3互換ストレージへの接続設定。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Settings {
    /// S3互換エンドポイント（MinIO等）。Noneの場合はAWS S3
    pub endpoint: Option<String>,
    /// リージョン。Noneの場合はエンドポイントから推定する
    pub region: Option<String>,
    /// 静的アクセスキー。Noneの場合は環境の認証情報を使う
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl S3Settings {
    pub const DEFAULT_REGION: &'static str = "us-east-1";

    /// カスタムエンドポイント用のリージョンを決める。
    ///
    /// 明示指定がなければ `s3.REGION.amazonaws.com` 形式から検出し、
    /// それ以外のエンドポイントでは `us-east-1` を使う。
    pub fn region_for_endpoint(&self, endpoint: &str) -> String {
        if let Some(region) = &self.region {
            return region.clone();
        }
        endpoint
            .find("s3.")
            .and_then(|start| {
                let rest = &endpoint[start + 3..];
                rest.find(".amazonaws.com").map(|end| rest[..end].to_string())
            })
            .unwrap_or_else(|| Self::DEFAULT_REGION.to_string())
    }
}

/// Photo APIの設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoConfig {
    /// メタデータテーブル名（`PHOTOS_TABLE`）
    pub table_name: String,
    /// 画像を保存するバケット（`PHOTOS_BUCKET`、必須）
    pub bucket_name: String,
    /// メタデータレコードを保存するバケット（`PHOTOS_METADATA_BUCKET`）
    pub metadata_bucket_name: String,
    /// 署名付きURLの有効期限（秒）（`URL_EXPIRATION`）
    pub url_expiration_secs: u32,
    /// デコード後の画像サイズ上限（バイト）（`MAX_UPLOAD_BYTES`）
    pub max_upload_bytes: usize,
    /// HTTPの待受アドレス（`LISTEN_ADDR`）
    pub listen_addr: String,
    pub s3: S3Settings,
}

impl PhotoConfig {
    pub const DEFAULT_TABLE: &'static str = "Photos";
    pub const DEFAULT_URL_EXPIRATION_SECS: u32 = 3600;
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
    pub const DEFAULT_LISTEN_ADDR: &'static str = "0.0.0.0:3000";

    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// 任意の変数ソースから構築する。空文字列は未設定として扱う。
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bucket_name = var("PHOTOS_BUCKET").context("PHOTOS_BUCKETが設定されていません")?;
        let metadata_bucket_name =
            var("PHOTOS_METADATA_BUCKET").unwrap_or_else(|| bucket_name.clone());

        let url_expiration_secs = match var("URL_EXPIRATION") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|secs| *secs > 0)
                .with_context(|| {
                    format!("URL_EXPIRATIONは正の整数（秒）である必要があります: {raw}")
                })?,
            None => Self::DEFAULT_URL_EXPIRATION_SECS,
        };

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().with_context(|| {
                format!("MAX_UPLOAD_BYTESは整数（バイト）である必要があります: {raw}")
            })?,
            None => Self::DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            table_name: var("PHOTOS_TABLE").unwrap_or_else(|| Self::DEFAULT_TABLE.to_string()),
            bucket_name,
            metadata_bucket_name,
            url_expiration_secs,
            max_upload_bytes,
            listen_addr: var("LISTEN_ADDR")
                .unwrap_or_else(|| Self::DEFAULT_LISTEN_ADDR.to_string()),
            s3: S3Settings {
                endpoint: var("S3_ENDPOINT"),
                region: var("S3_REGION"),
                access_key: var("S3_ACCESS_KEY"),
                secret_key: var("S3_SECRET_KEY"),
            },
        })
    }
}

/// リクエスト間で共有する状態。
///
/// 各ハンドラはストアのハンドルを保持しており、起動時に一度だけ構築される。
pub struct AppState {
    pub upload: UploadHandler,
    pub retrieval: RetrievalHandler,
}
