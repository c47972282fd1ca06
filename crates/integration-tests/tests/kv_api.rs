//! End-to-end tests against the key-value backends.

use reqwest::StatusCode;
use serde_json::{Value, json};
use stores_deals_integration_tests::TestServer;

fn amazon_flash_deal() -> Value {
    json!({
        "amazon": {
            "name": "Amazon",
            "logo": "/assets/amazon.png",
            "bgColor": "from-yellow-400 to-yellow-500",
            "color": "#000",
            "active": true,
            "deals": [{
                "id": "1",
                "title": "Flash Deal",
                "description": "Up to 70% off electronics",
                "importance": "high",
                "link": "https://amazon.com/deals",
                "active": true
            }]
        }
    })
}

// ============================================================================
// Document round trip
// ============================================================================

#[tokio::test]
async fn test_empty_document_on_fresh_store() {
    let server = TestServer::managed_kv().await;
    let (status, body) = server.get_json("/api/data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "stores": {}, "footerLinks": {}, "admins": [] }));
}

#[tokio::test]
async fn test_amazon_flash_deal_round_trip() {
    let server = TestServer::managed_kv().await;

    let (status, body) = server
        .post_json("/api/admin/save", &json!({ "stores": amazon_flash_deal() }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = server.get_json("/api/data").await;
    assert_eq!(body["stores"], amazon_flash_deal());
    assert_eq!(body["stores"]["amazon"]["deals"][0]["title"], "Flash Deal");
}

#[tokio::test]
async fn test_empty_stores_save_keeps_footer_links() {
    let server = TestServer::local_files().await;
    let footer_links = json!({
        "legal": [{ "id": "1", "title": "Privacy Policy", "link": "/privacy-policy", "active": true }]
    });

    server
        .post_json("/api/admin/save", &json!({ "footerLinks": footer_links }))
        .await;
    let (status, _) = server
        .post_json("/api/admin/save", &json!({ "stores": {} }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get_json("/api/data").await;
    assert_eq!(body["stores"], json!({}));
    assert_eq!(body["footerLinks"], footer_links);
}

#[tokio::test]
async fn test_local_files_written_to_data_dir() {
    let server = TestServer::local_files().await;
    server
        .post_json("/api/admin/save", &json!({ "stores": amazon_flash_deal() }))
        .await;

    let dir = server.data_dir.as_ref().expect("local server has a data dir");
    let raw = std::fs::read_to_string(dir.path().join("stores.json")).expect("stores.json");
    let stored: Value = serde_json::from_str(&raw).expect("stores.json is JSON");
    assert_eq!(stored, amazon_flash_deal());
}

// ============================================================================
// Store creation
// ============================================================================

#[tokio::test]
async fn test_quick_successive_creates_get_distinct_ids() {
    let server = TestServer::managed_kv().await;
    let store = json!({ "name": "Shein", "logo": "shein.png", "active": true });

    let ((_, first), (_, second)) = tokio::join!(
        server.post_json("/api/admin/stores", &store),
        server.post_json("/api/admin/stores", &store),
    );
    let first = first["storeId"].as_str().expect("storeId").to_string();
    let second = second["storeId"].as_str().expect("storeId").to_string();

    assert_ne!(first, second, "store ids collided");
    assert!(first.starts_with("store-"));

    let (_, body) = server.get_json("/api/admin/stores").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["stores"].as_object().map(serde_json::Map::len), Some(2));

    let (status, body) = server.get_json(&format!("/api/admin/stores/{second}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["id"], second.as_str());
    assert_eq!(body["store"]["deals"], json!([]));
}

#[tokio::test]
async fn test_missing_store_is_404() {
    let server = TestServer::managed_kv().await;
    let (status, body) = server.get_json("/api/admin/stores/store-missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Store not found" }));
}
