//! Store operations over real HTTP against a mock vault server.

mod support;

use mockito::{Matcher, Server};
use serde_json::json;

use edvault::{KeyValueStore, Provider, Store, VaultConfig};
use support::{document, mac};

const DOC_ID: &str = "VJYHHJx4C8J9Fsgz7rZqSp";

fn open(server: &Server) -> (Provider, Store) {
    let provider = Provider::new(VaultConfig::new(&server.url(), "vaultID"), mac()).unwrap();
    let store = provider.open_store("StoreName").unwrap();
    (provider, store)
}

fn query_returns(server: &mut Server, store: &Store, locations: serde_json::Value) -> mockito::Mock {
    server
        .mock("POST", "/vaultID/query")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(
            json!({ "value": store.key_token("key").unwrap() }),
        ))
        .with_status(200)
        .with_body(locations.to_string())
        .create()
}

#[test]
fn get_follows_the_location_returned_by_the_query() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);
    let body = document(DOC_ID, "c2VjcmV0");

    let query = query_returns(
        &mut server,
        &store,
        json!([format!("https://some-other-host/encrypted-data-vaults/vaultID/documents/{DOC_ID}")]),
    );
    let read = server
        .mock("GET", format!("/vaultID/documents/{DOC_ID}").as_str())
        .with_status(200)
        .with_body(body.clone())
        .create();

    assert_eq!(store.get("key").unwrap(), body);
    query.assert();
    read.assert();
}

#[test]
fn get_reports_query_failure() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);
    let _mock = server
        .mock("POST", "/vaultID/query")
        .with_status(500)
        .with_body("test error")
        .create();

    let err = store.get("key").unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to retrieve document id: failed to query vault: status code 500 was returned \
         along with the following message: test error"
    );
}

#[test]
fn get_with_no_match_is_not_found() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);
    let _query = query_returns(&mut server, &store, json!([]));

    assert!(store.get("key").unwrap_err().is_not_found());
}

#[test]
fn get_with_two_matches_is_ambiguous() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);
    let _query = query_returns(&mut server, &store, json!(["a", "b"]));

    assert!(store.get("key").unwrap_err().is_ambiguous());
}

#[test]
fn put_creates_when_nothing_matches() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);

    let query = query_returns(&mut server, &store, json!([]));
    let create = server
        .mock("POST", "/vaultID/documents")
        .match_body(Matcher::PartialJson(json!({ "id": DOC_ID })))
        .with_status(201)
        .with_header("location", &format!("{}/vaultID/documents/{DOC_ID}", server.url()))
        .create();

    store.put("key", &document(DOC_ID, "YQ")).unwrap();
    query.assert();
    create.assert();
}

#[test]
fn put_updates_the_single_match() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);

    let _query = query_returns(&mut server, &store, json!([DOC_ID]));
    let update = server
        .mock("PUT", format!("/vaultID/documents/{DOC_ID}").as_str())
        .with_status(204)
        .create();
    let create = server
        .mock("POST", "/vaultID/documents")
        .expect(0)
        .create();

    store.put("key", &document(DOC_ID, "YQ")).unwrap();
    update.assert();
    create.assert();
}

#[test]
fn put_without_location_header_fails() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);

    let _query = query_returns(&mut server, &store, json!([]));
    let _mock = server
        .mock("POST", "/vaultID/documents")
        .with_status(201)
        .create();

    let err = store.put("key", &document(DOC_ID, "YQ")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to store document: failed to create document in vault: vault response to \
         document creation is missing the Location header"
    );
}

#[test]
fn delete_removes_the_single_match() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);

    let _query = query_returns(&mut server, &store, json!([DOC_ID]));
    let delete = server
        .mock("DELETE", format!("/vaultID/documents/{DOC_ID}").as_str())
        .with_status(200)
        .create();

    store.delete("key").unwrap();
    delete.assert();
}

#[test]
fn delete_reports_server_failure() {
    let mut server = Server::new();
    let (_provider, store) = open(&server);

    let _query = query_returns(&mut server, &store, json!([DOC_ID]));
    let _mock = server
        .mock("DELETE", format!("/vaultID/documents/{DOC_ID}").as_str())
        .with_status(500)
        .with_body("test error")
        .create();

    let err = store.delete("key").unwrap_err();
    assert_eq!(err.vault_status(), Some(500));
    assert!(err.to_string().starts_with("failed to delete document in vault:"));
}
