//! # ハンドラテスト用共通ヘルパー
//!
//! 呼び出し回数を記録するインメモリのモックストア群。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use photo_types::PhotoRecord;

use crate::error::StoreError;
use crate::handlers::{RetrievalHandler, UploadHandler};
use crate::metadata::MetadataStore;
use crate::storage::BlobStore;

/// テスト用のモックBlobストア。
/// S3への接続なしで書き込み内容を保持し、ダミーの署名付きURLを返す。
#[derive(Default)]
pub struct MockBlobStore {
    /// key → (bytes, content_type)
    pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    pub put_calls: AtomicUsize,
    /// (key, expiry_secs)
    pub sign_calls: Mutex<Vec<(String, u32)>>,
    pub fail_put: bool,
    pub fail_sign: bool,
    /// 指定時はsignが常にこのURLを返す
    pub signed_url: Option<String>,
}

impl MockBlobStore {
    pub fn put_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn sign_count(&self) -> usize {
        self.sign_calls.lock().unwrap().len()
    }

    pub fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait::async_trait]
impl BlobStore for MockBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(StoreError::Request(
                "connection refused: internal-minio:9000".to_string(),
            ));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn sign(&self, key: &str, expiry_secs: u32) -> Result<String, StoreError> {
        self.sign_calls
            .lock()
            .unwrap()
            .push((key.to_string(), expiry_secs));
        if self.fail_sign {
            return Err(StoreError::Request("AccessDenied: signing key".to_string()));
        }
        Ok(self.signed_url.clone().unwrap_or_else(|| {
            format!("http://mock-storage/{key}?expires={expiry_secs}&sig=test")
        }))
    }
}

/// テスト用のモックメタデータストア。
#[derive(Default)]
pub struct MockMetadataStore {
    pub records: Mutex<HashMap<String, PhotoRecord>>,
    pub get_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    pub fail_get: bool,
    pub fail_put: bool,
}

impl MockMetadataStore {
    pub fn with_record(record: PhotoRecord) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .unwrap()
            .insert(record.photo_id.clone(), record);
        store
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl MetadataStore for MockMetadataStore {
    async fn get(&self, photo_id: &str) -> Result<Option<PhotoRecord>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get {
            return Err(StoreError::Status {
                status: 503,
                key: format!("Photos/{photo_id}.json"),
            });
        }
        Ok(self.records.lock().unwrap().get(photo_id).cloned())
    }

    async fn put(&self, record: &PhotoRecord) -> Result<(), StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(StoreError::Request(
                "ProvisionedThroughputExceeded".to_string(),
            ));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.photo_id.clone(), record.clone());
        Ok(())
    }
}

/// テスト用の上限サイズ
pub const TEST_MAX_UPLOAD_BYTES: usize = 1024;

/// テスト用の署名付きURL有効期限
pub const TEST_URL_EXPIRATION_SECS: u32 = 900;

pub fn upload_handler(
    blobs: &Arc<MockBlobStore>,
    records: &Arc<MockMetadataStore>,
) -> UploadHandler {
    UploadHandler::new(blobs.clone(), records.clone(), TEST_MAX_UPLOAD_BYTES)
}

pub fn retrieval_handler(
    blobs: &Arc<MockBlobStore>,
    records: &Arc<MockMetadataStore>,
) -> RetrievalHandler {
    RetrievalHandler::new(blobs.clone(), records.clone(), TEST_URL_EXPIRATION_SECS)
}

/// レスポンスボディをJSONとしてパースする
pub fn body_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}
