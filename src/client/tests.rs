//! Tests for client module

use super::*;
use crate::error::Error;
use crate::pagination::{all_items, PaginationConfig, PaginationRequest};
use crate::types::{JsonObject, JsonValue};
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use test_case::test_case;

fn object(value: JsonValue) -> JsonObject {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

async fn bucket_with(keys: &[&str]) -> Arc<dyn ObjectStore> {
    let store = InMemory::new();
    for key in keys {
        store
            .put(&ObjectPath::from(*key), key.as_bytes().to_vec().into())
            .await
            .unwrap();
    }
    Arc::new(store)
}

async fn store_client(keys: &[&str]) -> StoreClient {
    StoreClient::new(Backend::S3).with_bucket("data", bucket_with(keys).await)
}

fn keys_of(page: &JsonObject) -> Vec<String> {
    page["Contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["Key"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Backend Tests
// ============================================================================

#[test_case("s3", Backend::S3 ; "s3 bare")]
#[test_case("s3://", Backend::S3 ; "s3 url")]
#[test_case("r2://", Backend::R2 ; "r2 url")]
#[test_case("gs", Backend::Gcs ; "gcs bare")]
#[test_case("az://", Backend::Azure ; "azure url")]
#[test_case("/srv/buckets", Backend::Local(PathBuf::from("/srv/buckets")) ; "plain path")]
#[test_case("file:///srv/buckets", Backend::Local(PathBuf::from("/srv/buckets")) ; "file url")]
fn test_backend_parse(location: &str, expected: Backend) {
    assert_eq!(Backend::parse(location).unwrap(), expected);
}

#[test]
fn test_backend_parse_rejects_bucket_in_location() {
    let err = Backend::parse("s3://my-bucket/path").unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_backend_parse_rejects_empty() {
    assert!(Backend::parse("  ").is_err());
}

#[test]
fn test_backend_scheme() {
    assert_eq!(Backend::S3.scheme(), "s3");
    assert_eq!(Backend::Local(PathBuf::from(".")).scheme(), "file");
}

// ============================================================================
// MemoryClient Tests
// ============================================================================

#[test]
fn test_memory_client_operations() {
    let client = MemoryClient::new()
        .with_pages("list_objects", vec![])
        .with_pages("list_buckets", vec![]);

    assert_eq!(
        client.operation_names(),
        vec!["list_buckets".to_string(), "list_objects".to_string()]
    );
    assert!(client.can_paginate("list_objects"));
    assert!(!client.can_paginate("get_object"));

    let err = client.get_paginator("get_object").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Operation cannot be paginated: get_object (available: list_buckets, list_objects)"
    );
}

#[tokio::test]
async fn test_scripted_operation_tokens_are_page_indexes() {
    let op = ScriptedOperation::new("list_objects")
        .with_page(json!({"Contents": [1]}))
        .with_page(json!({"Contents": [2]}));

    let first = op.call(&JsonObject::new(), None, None).await.unwrap().unwrap();
    assert_eq!(first.next_token.as_deref(), Some("1"));

    let second = op
        .call(&JsonObject::new(), Some("1"), Some(10))
        .await
        .unwrap()
        .unwrap();
    assert!(second.next_token.is_none());
    assert_eq!(JsonValue::Object(second.body), json!({"Contents": [2]}));

    assert!(op
        .call(&JsonObject::new(), Some("9"), None)
        .await
        .unwrap()
        .is_none());
    assert!(op.call(&JsonObject::new(), Some("x"), None).await.is_err());

    let calls = op.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[1].page_size, Some(10));
}

#[tokio::test]
async fn test_scripted_operation_rejects_non_object_page() {
    let op = ScriptedOperation::new("list_objects").with_page(json!([1, 2]));
    let err = op.call(&JsonObject::new(), None, None).await.unwrap_err();
    assert!(err.to_string().contains("not an object"));
}

// ============================================================================
// StoreClient Tests
// ============================================================================

#[test]
fn test_store_client_operations() {
    let client = StoreClient::new(Backend::S3);
    assert!(client.can_paginate(LIST_OBJECTS));
    assert!(client.can_paginate(LIST_OBJECTS_V2));
    assert!(!client.can_paginate("list_buckets"));
    assert!(matches!(
        client.get_paginator("list_buckets"),
        Err(Error::UnknownPaginator { .. })
    ));
}

#[tokio::test]
async fn test_list_objects_single_page() {
    let client = store_client(&["b.txt", "a.txt", "c/d.txt"]).await;
    let op = client.operation(LIST_OBJECTS).unwrap();

    let page = op
        .call(&object(json!({"Bucket": "data"})), None, None)
        .await
        .unwrap()
        .unwrap();

    assert!(page.next_token.is_none());
    assert_eq!(keys_of(&page.body), vec!["a.txt", "b.txt", "c/d.txt"]);
    assert_eq!(page.body["Name"], json!("data"));
    assert_eq!(page.body["IsTruncated"], json!(false));
    assert_eq!(page.body["MaxKeys"], json!(1000));
    assert!(page.body.get("NextMarker").is_none());

    let entry = &page.body["Contents"][0];
    assert_eq!(entry["Size"], json!(5));
    assert!(entry["LastModified"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_list_objects_pages_with_marker() {
    let client = store_client(&["k1", "k2", "k3", "k4", "k5"]).await;
    let op = client.operation(LIST_OBJECTS).unwrap();
    let params = object(json!({"Bucket": "data"}));

    let first = op.call(&params, None, Some(2)).await.unwrap().unwrap();
    assert_eq!(keys_of(&first.body), vec!["k1", "k2"]);
    assert_eq!(first.next_token.as_deref(), Some("k2"));
    assert_eq!(first.body["NextMarker"], json!("k2"));
    assert_eq!(first.body["IsTruncated"], json!(true));

    let second = op.call(&params, Some("k2"), Some(2)).await.unwrap().unwrap();
    assert_eq!(keys_of(&second.body), vec!["k3", "k4"]);

    let last = op.call(&params, Some("k4"), Some(2)).await.unwrap().unwrap();
    assert_eq!(keys_of(&last.body), vec!["k5"]);
    assert!(last.next_token.is_none());
}

#[tokio::test]
async fn test_list_objects_prefix_and_marker_params() {
    let client = store_client(&["logs/1", "logs/2", "logs/3", "other/1"]).await;
    let op = client.operation(LIST_OBJECTS).unwrap();

    let page = op
        .call(
            &object(json!({"Bucket": "data", "Prefix": "logs", "Marker": "logs/1"})),
            None,
            None,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(keys_of(&page.body), vec!["logs/2", "logs/3"]);
    assert_eq!(page.body["Marker"], json!("logs/1"));
    assert_eq!(page.body["Prefix"], json!("logs"));
}

#[tokio::test]
async fn test_list_objects_v2_fields() {
    let client = store_client(&["a", "b", "c"]).await;
    let op = client.operation(LIST_OBJECTS_V2).unwrap();

    let page = op
        .call(&object(json!({"Bucket": "data", "StartAfter": "a"})), None, Some(1))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(keys_of(&page.body), vec!["b"]);
    assert_eq!(page.body["KeyCount"], json!(1));
    assert_eq!(page.body["StartAfter"], json!("a"));
    assert_eq!(page.body["NextContinuationToken"], json!("b"));
    assert!(page.body.get("NextMarker").is_none());
}

#[tokio::test]
async fn test_list_objects_v2_continuation_token_resumes() {
    let client = store_client(&["a", "b", "c", "d"]).await;
    let op = client.operation(LIST_OBJECTS_V2).unwrap();

    let first = op
        .call(&object(json!({"Bucket": "data"})), None, Some(2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(keys_of(&first.body), vec!["a", "b"]);
    let token = first.body["NextContinuationToken"].as_str().unwrap().to_string();

    // ContinuationToken wins over StartAfter
    let params = object(json!({
        "Bucket": "data",
        "StartAfter": "a",
        "ContinuationToken": token,
    }));
    let second = op.call(&params, None, Some(2)).await.unwrap().unwrap();
    assert_eq!(keys_of(&second.body), vec!["c", "d"]);
    assert_eq!(second.body["ContinuationToken"], json!(token));
    assert_eq!(second.body["StartAfter"], json!("a"));
    assert_eq!(second.body["IsTruncated"], json!(false));
    assert!(second.body.get("NextContinuationToken").is_none());

    let mut params = params;
    params.insert("PaginationConfig".to_string(), json!({"PageSize": 1}));
    let items = all_items(&client, LIST_OBJECTS_V2, "Contents", params)
        .try_collect_all()
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["Key"], json!("c"));
}

#[tokio::test]
async fn test_list_objects_v2_rejects_malformed_continuation_token() {
    let client = store_client(&["a"]).await;
    let op = client.operation(LIST_OBJECTS_V2).unwrap();

    let err = op
        .call(
            &object(json!({"Bucket": "data", "ContinuationToken": "a//b"})),
            None,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidParameter { ref name, .. } if name == "ContinuationToken"
    ));
}

#[test_case(LIST_OBJECTS ; "v1")]
#[test_case(LIST_OBJECTS_V2 ; "v2")]
#[tokio::test]
async fn test_reserved_characters_in_keys_across_pages(paginator: &str) {
    let client = store_client(&["a#1", "a#2", "a%3"]).await;
    let params = object(json!({"Bucket": "data", "PaginationConfig": {"PageSize": 1}}));

    let items = all_items(&client, paginator, "Contents", params)
        .try_collect_all()
        .await
        .unwrap();
    let keys: Vec<&str> = items.iter().map(|item| item["Key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["a#1", "a#2", "a%3"]);
}

#[tokio::test]
async fn test_marker_is_a_plain_key() {
    let client = store_client(&["a#1", "a#2", "a%3"]).await;
    let op = client.operation(LIST_OBJECTS).unwrap();

    let page = op
        .call(&object(json!({"Bucket": "data", "Marker": "a#1"})), None, Some(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(keys_of(&page.body), vec!["a#2"]);
    assert_eq!(page.body["Marker"], json!("a#1"));
    assert_eq!(page.body["NextMarker"], json!("a#2"));

    let token = page.next_token.unwrap();
    let last = op
        .call(&object(json!({"Bucket": "data"})), Some(token.as_str()), Some(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(keys_of(&last.body), vec!["a%3"]);
    assert_eq!(last.body["Marker"], json!("a#2"));
}

const LOG_KEYS: &[&str] = &[
    "logs/2024-01.txt",
    "logs/2024-02.txt",
    "logs/2025-01.txt",
    "logs/old/x",
];

#[test_case("logs/2024-0", &["logs/2024-01.txt", "logs/2024-02.txt"] ; "ends mid segment")]
#[test_case("logs/", LOG_KEYS ; "whole segment")]
#[test_case("lo", LOG_KEYS ; "first segment")]
#[test_case("logs/old/", &["logs/old/x"] ; "nested segment")]
#[test_case("missing/pre", &[] ; "no match")]
#[tokio::test]
async fn test_prefix_is_a_string_prefix(prefix: &str, expected: &[&str]) {
    let mut keys = LOG_KEYS.to_vec();
    keys.push("other");
    let client = store_client(&keys).await;
    let params = object(json!({
        "Bucket": "data",
        "Prefix": prefix,
        "PaginationConfig": {"PageSize": 1},
    }));

    let items = all_items(&client, LIST_OBJECTS, "Contents", params)
        .try_collect_all()
        .await
        .unwrap();
    let keys: Vec<&str> = items.iter().map(|item| item["Key"].as_str().unwrap()).collect();
    assert_eq!(keys, expected);
}

#[tokio::test]
async fn test_list_objects_empty_bucket_has_empty_contents() {
    let client = store_client(&[]).await;
    let op = client.operation(LIST_OBJECTS).unwrap();

    let page = op
        .call(&object(json!({"Bucket": "data"})), None, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.body["Contents"], json!([]));
}

#[test_case(json!({}), "Missing required parameter in input: \"Bucket\"" ; "missing bucket")]
#[test_case(json!({"Bucket": 7}), "Invalid value for parameter \"Bucket\": expected a string, got a number" ; "bucket not a string")]
#[test_case(json!({"Bucket": "data", "MaxKeys": 5}), "Unknown parameter in input: \"MaxKeys\", must be one of: Bucket, Prefix, Marker" ; "unknown param")]
#[tokio::test]
async fn test_list_objects_param_validation(params: JsonValue, message: &str) {
    let client = store_client(&["a"]).await;
    let op = client.operation(LIST_OBJECTS).unwrap();

    let err = op.call(&object(params), None, None).await.unwrap_err();
    assert_eq!(err.to_string(), message);
}

#[tokio::test]
async fn test_local_backend_missing_bucket() {
    let root = tempfile::tempdir().unwrap();
    let client = StoreClient::new(Backend::Local(root.path().to_path_buf()));
    let op = client.operation(LIST_OBJECTS).unwrap();

    let err = op
        .call(&object(json!({"Bucket": "nope"})), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoSuchBucket { ref bucket } if bucket == "nope"));
}

#[tokio::test]
async fn test_store_client_with_paginator_and_all_items() {
    let client = store_client(&["k1", "k2", "k3", "k4", "k5"]).await;

    let paginator = client.get_paginator(LIST_OBJECTS).unwrap();
    let mut pages = paginator
        .paginate(PaginationRequest::new(
            object(json!({"Bucket": "data"})),
            PaginationConfig::new().with_page_size(2),
        ))
        .unwrap();
    let mut page_keys = Vec::new();
    while let Some(page) = pages.next_page().await {
        page_keys.push(keys_of(&page.unwrap()));
    }
    assert_eq!(
        page_keys,
        vec![vec!["k1", "k2"], vec!["k3", "k4"], vec!["k5"]]
    );

    let params = object(json!({"Bucket": "data", "PaginationConfig": {"PageSize": 2}}));
    let items = all_items(&client, LIST_OBJECTS, "Contents", params)
        .try_collect_all()
        .await
        .unwrap();
    assert_eq!(items.len(), 5);
}
