//! # Content-Type推定
//!
//! ファイル名の拡張子からBlob書き込み時のContent-Typeを決める純関数。

use std::path::Path;

/// 拡張子が未知・欠落の場合のContent-Type
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// ファイル名からContent-Typeを推定する。拡張子は大文字小文字を区別しない。
pub fn content_type_for(file_name: &str) -> &'static str {
    let Some(ext) = Path::new(file_name).extension().and_then(|e| e.to_str()) else {
        return FALLBACK_CONTENT_TYPE;
    };
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        _ => FALLBACK_CONTENT_TYPE,
    }
}
