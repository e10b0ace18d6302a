use chrono::DateTime;
use house_collector::{upsert, CollectorError, DocumentStore, Listing, RestStore, UpsertOutcome};
use httpmock::prelude::*;

fn listing(id: &str, price: i64, modified: &str) -> Listing {
    let mut listing = Listing::new();
    listing.insert("_id", id);
    listing.insert("price", price);
    listing.insert(
        "date_modified",
        DateTime::parse_from_rfc3339(modified).unwrap(),
    );
    listing
}

#[tokio::test]
async fn test_get_latest_deserializes_record() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/imovirtual/latest");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "_id": "L1",
                "price": 100,
                "date_modified": "2022-09-20T12:21:43+01:00"
            }));
    });

    let store = RestStore::new(&server.base_url()).unwrap();
    let latest = store.get_latest("imovirtual").await.unwrap().unwrap();

    mock.assert();
    assert_eq!(latest.id_str().unwrap(), "L1");
    assert_eq!(
        latest.date_modified().unwrap(),
        DateTime::parse_from_rfc3339("2022-09-20T12:21:43+01:00").unwrap()
    );
}

#[tokio::test]
async fn test_get_latest_404_means_empty_collection() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/imovirtual/latest");
        then.status(404);
    });

    let store = RestStore::new(&server.base_url()).unwrap();
    assert!(store.get_latest("imovirtual").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_latest_server_error_is_a_read_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/imovirtual/latest");
        then.status(500);
    });

    let store = RestStore::new(&server.base_url()).unwrap();
    let result = store.get_latest("imovirtual").await;
    assert!(matches!(result, Err(CollectorError::StoreRead { .. })));
}

#[tokio::test]
async fn test_upsert_inserts_when_absent() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/olx/L1");
        then.status(404);
    });
    let insert = server.mock(|when, then| {
        when.method(POST).path("/olx");
        then.status(201);
    });

    let store = RestStore::new(&server.base_url()).unwrap();
    let outcome = upsert(&store, "olx", &listing("L1", 100, "2022-09-20T12:21:43+01:00"))
        .await
        .unwrap();

    assert_eq!(outcome, UpsertOutcome::Inserted);
    insert.assert();
}

#[tokio::test]
async fn test_upsert_identical_record_writes_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/olx/L1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "_id": "L1",
                "price": 100,
                "date_modified": "2022-09-20T12:21:43+01:00"
            }));
    });
    let insert = server.mock(|when, then| {
        when.method(POST).path("/olx");
        then.status(201);
    });
    let replace = server.mock(|when, then| {
        when.method(PUT).path("/olx/L1");
        then.status(200);
    });

    let store = RestStore::new(&server.base_url()).unwrap();
    let outcome = upsert(&store, "olx", &listing("L1", 100, "2022-09-20T12:21:43+01:00"))
        .await
        .unwrap();

    assert_eq!(outcome, UpsertOutcome::Unchanged);
    insert.assert_hits(0);
    replace.assert_hits(0);
}

#[tokio::test]
async fn test_upsert_changed_record_is_replaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/olx/L1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "_id": "L1",
                "price": 100,
                "date_modified": "2022-09-20T12:21:43+01:00"
            }));
    });
    let replace = server.mock(|when, then| {
        when.method(PUT).path("/olx/L1");
        then.status(200);
    });

    let store = RestStore::new(&server.base_url()).unwrap();
    let outcome = upsert(&store, "olx", &listing("L1", 120, "2022-09-21T08:00:00+01:00"))
        .await
        .unwrap();

    assert_eq!(outcome, UpsertOutcome::Replaced);
    replace.assert();
}

#[tokio::test]
async fn test_failed_write_is_a_store_write_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/olx/L1");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(POST).path("/olx");
        then.status(503);
    });

    let store = RestStore::new(&server.base_url()).unwrap();
    let result = upsert(&store, "olx", &listing("L1", 100, "2022-09-20T12:21:43+01:00")).await;

    assert!(matches!(result, Err(CollectorError::StoreWrite { .. })));
}
