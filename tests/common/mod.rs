use std::time::Duration;

use serde_json::{json, Value};
use vikingdb::model::Fields;
use vikingdb::{Auth, Client, Config};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Client against the mock server, authenticating with an api key.
#[allow(dead_code)]
pub fn client(server: &MockServer) -> Client {
    client_with(server, Auth::api_key(TOKEN), 3)
}

#[allow(dead_code)]
pub fn client_with(server: &MockServer, auth: Auth, max_retries: i32) -> Client {
    let config = Config::new(server.uri())
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(max_retries);
    Client::new(auth, config).unwrap()
}

/// A successful response envelope wrapping `result`.
#[allow(dead_code)]
pub fn ok_body(api: &str, request_id: &str, result: Value) -> Value {
    json!({
        "api": api,
        "code": "Success",
        "message": "ok",
        "request_id": request_id,
        "result": result,
    })
}

#[allow(dead_code)]
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
