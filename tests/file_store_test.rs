//! End-to-end tests over the flat-file store, including reload.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use uidhub_core::config::store::{CorruptStorePolicy, FileStoreConfig};
use uidhub_core::types::key::KeyScope;
use uidhub_store::FileEntitlementStore;

use helpers::TestApp;

fn file_config(dir: &tempfile::TempDir) -> FileStoreConfig {
    FileStoreConfig {
        path: dir
            .path()
            .join("entitlements.json")
            .to_string_lossy()
            .into_owned(),
        on_corrupt: CorruptStorePolicy::Fail,
    }
}

#[tokio::test]
async fn test_mutations_survive_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);

    {
        let store = FileEntitlementStore::open(&config, KeyScope::Uid)
            .await
            .unwrap();
        let app = TestApp::with_store(Arc::new(store));

        app.request(
            "POST",
            "/uid",
            Some(json!({"uid": "1001", "platform": "android"})),
        )
        .await;
        let (status, _) = app
            .request("POST", "/uid/1001/adddays", Some(json!({"days": 30})))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let store = FileEntitlementStore::open(&config, KeyScope::Uid)
        .await
        .unwrap();
    let app = TestApp::with_store(Arc::new(store));

    let (status, body) = app.request("GET", "/uid/1001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], "android");
    assert_eq!(body["days_remaining"], 30);
    assert!(body["expire_date"].is_string());

    let (_, body) = app.request("GET", "/uid/1001/check", None).await;
    assert_eq!(body["active"], true);
}

#[tokio::test]
async fn test_corrupt_collection_refuses_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);
    tokio::fs::write(&config.path, "{\"entitlements\": [{\"uid\"")
        .await
        .unwrap();

    assert!(
        FileEntitlementStore::open(&config, KeyScope::Uid)
            .await
            .is_err()
    );
}
