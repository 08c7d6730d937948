//! # 写真ハンドラ
//!
//! エンベロープを受け取り、検証 → ストア操作 → レスポンス構築を順に行う。
//! ストア操作は1リクエスト内で逐次実行され、失敗時は再試行しない。
//!
//! ## ハンドラ
//! - `UploadHandler` — 画像をBlobストアへ書き込み、メタデータを保存
//! - `RetrievalHandler` — メタデータを取得し、署名付きURLを発行

pub mod retrieve;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use retrieve::RetrievalHandler;
pub use upload::UploadHandler;
