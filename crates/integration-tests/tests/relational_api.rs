//! End-to-end tests against the relational backend.

use reqwest::StatusCode;
use serde_json::{Value, json};
use stores_deals_integration_tests::TestServer;

fn deal(title: &str, active: bool) -> Value {
    json!({
        "title": title,
        "description": "",
        "importance": "medium",
        "link": "https://temu.com",
        "active": active
    })
}

// ============================================================================
// Document round trip
// ============================================================================

#[tokio::test]
async fn test_seeded_categories_on_fresh_database() {
    let server = TestServer::relational().await;
    let (status, body) = server.get_json("/api/data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stores"], json!({}));
    assert_eq!(
        body["footerLinks"],
        json!({ "about": [], "support": [], "legal": [] })
    );
}

#[tokio::test]
async fn test_save_round_trip_modulo_ids() {
    let server = TestServer::relational().await;
    let payload = json!({
        "stores": {
            "temu": {
                "name": "Temu",
                "logo": "/assets/temu.png",
                "bgColor": "from-orange-500 to-orange-600",
                "color": "#fff",
                "active": true,
                "deals": [deal("Visible", true), deal("Hidden", false)]
            }
        },
        "footerLinks": {
            "legal": [{ "title": "Terms", "link": "/terms", "active": true }]
        }
    });

    let (status, _) = server.post_json("/api/admin/save", &payload).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get_json("/api/data").await;
    let stores = body["stores"].as_object().expect("stores object");
    assert_eq!(stores.len(), 1);
    let temu = &stores["temu"];
    assert_eq!(temu["name"], "Temu");
    assert_eq!(temu["deals"].as_array().map(Vec::len), Some(1));
    assert_eq!(temu["deals"][0]["title"], "Visible");
    assert_eq!(body["footerLinks"]["legal"][0]["title"], "Terms");
}

#[tokio::test]
async fn test_resaving_fetched_document_is_idempotent() {
    let server = TestServer::relational().await;
    server
        .post_json(
            "/api/admin/save",
            &json!({ "stores": { "new": { "name": "Shein", "active": true, "deals": [deal("A", true)] } } }),
        )
        .await;

    let (_, fetched) = server.get_json("/api/data").await;
    let resave = json!({ "stores": fetched["stores"], "footerLinks": fetched["footerLinks"] });
    for _ in 0..2 {
        let (status, _) = server.post_json("/api/admin/save", &resave).await;
        assert_eq!(status, StatusCode::OK);
    }

    // Deals are replaced on every save, so only their row ids may change
    let (_, after) = server.get_json("/api/data").await;
    assert_eq!(after["footerLinks"], fetched["footerLinks"]);
    let keys = |doc: &Value| doc["stores"].as_object().map(|m| m.keys().cloned().collect::<Vec<_>>());
    assert_eq!(keys(&after), keys(&fetched));
    let titles = |doc: &Value| {
        doc["stores"]["new"]["deals"]
            .as_array()
            .map(|deals| deals.iter().map(|d| d["title"].clone()).collect::<Vec<_>>())
    };
    assert_eq!(titles(&after), Some(vec![json!("A")]));
    assert_eq!(titles(&after), titles(&fetched));
}

#[tokio::test]
async fn test_posting_same_body_twice_keeps_one_store() {
    let server = TestServer::relational().await;
    let payload = json!({
        "stores": {
            "amazon": {
                "name": "Amazon",
                "logo": "/assets/amazon.png",
                "bgColor": "from-yellow-400 to-yellow-500",
                "color": "#000",
                "active": true,
                "deals": [deal("Flash Deal", true)]
            }
        }
    });

    for _ in 0..2 {
        let (status, _) = server.post_json("/api/admin/save", &payload).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = server.get_json("/api/data").await;
    let stores = body["stores"].as_object().expect("stores object");
    assert_eq!(stores.keys().collect::<Vec<_>>(), ["amazon"]);
    assert_eq!(stores["amazon"]["deals"].as_array().map(Vec::len), Some(1));

    let (status, body) = server.get_json("/api/admin/stores/amazon").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["id"], "amazon");
}

// ============================================================================
// Admin store routes
// ============================================================================

#[tokio::test]
async fn test_create_list_and_get_store() {
    let server = TestServer::relational().await;
    let (status, body) = server
        .post_json(
            "/api/admin/stores",
            &json!({
                "name": "AliExpress",
                "logo": "aliexpress.png",
                "bgColor": "from-red-500 to-red-600",
                "color": "#fff",
                "active": false,
                "deals": [deal("Zeta", true), deal("Alpha", false)]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let store_id = body["storeId"].as_str().expect("storeId is a string").to_string();

    let (_, body) = server.get_json("/api/admin/stores").await;
    assert_eq!(body["stores"][0]["name"], "AliExpress");
    assert_eq!(body["stores"][0]["bgColor"], "from-red-500 to-red-600");

    let (status, body) = server.get_json(&format!("/api/admin/stores/{store_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["logo"], "/assets/aliexpress.png");
    assert_eq!(body["store"]["deals"][0]["title"], "Alpha");
    assert_eq!(body["store"]["deals"][1]["title"], "Zeta");

    // Inactive stores are not part of the public document
    let (_, body) = server.get_json("/api/data").await;
    assert_eq!(body["stores"], json!({}));
}

#[tokio::test]
async fn test_missing_store_is_404() {
    let server = TestServer::relational().await;
    let (status, body) = server.get_json("/api/admin/stores/424242").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Store not found" }));
}
