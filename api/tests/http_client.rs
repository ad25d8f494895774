use std::sync::Arc;

use scoped_api::{
    security, Client, Error, Format, HttpConnection, OptionDef, ResponseOptions, RestMethod, Schema,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn schema(base_url: String) -> Arc<Schema> {
    Schema::define("Pets", move |root| {
        root.option("token", OptionDef::string())?
            .base_url(&base_url)
            .security_with(|s| Ok(security::token_auth(&s.text("token")?, security::TokenAuth::bearer())))
            .response(401, ResponseOptions::raising(), |_, r| r.json::<Value>().map_err(Error::from));
        root.scope("pets", |pets| {
            pets.path("pets");
            pets.operation("find", |find| {
                find.option("kind", OptionDef::string().default("cat"))?
                    .http_method(RestMethod::Get)
                    .query_with(|s| Ok(json!({"kind": s.get("kind")?})))
                    .response(200, ResponseOptions::default(), |_, r| r.json::<Value>().map_err(Error::from));
                Ok(())
            })?;
            pets.operation("create", |create| {
                create
                    .option("name", OptionDef::string())?
                    .http_method(RestMethod::Post)
                    .format(Format::Json)
                    .body_with(|s| Ok(json!({"name": s.get("name")?})))
                    .response_raw(&[201], ResponseOptions::default());
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap()
}

async fn call(uri: String, operation: &'static str, options: Value) -> Result<Value, Error> {
    tokio::task::spawn_blocking(move || {
        let client = Client::builder(schema(uri))
            .connection(Arc::new(HttpConnection::new()?))
            .build(json!({"token": "s3cret"}))?;
        client.scope("pets", Value::Null)?.call(operation, options)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_with_query_and_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("kind", "dog"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "Rex"}])))
        .mount(&mock_server)
        .await;

    let pets = call(mock_server.uri(), "find", json!({"kind": "dog"})).await.unwrap();
    assert_eq!(pets, json!([{"name": "Rex"}]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pets"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Tom"})))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .mount(&mock_server)
        .await;

    let created = call(mock_server.uri(), "create", json!({"name": "Tom"})).await.unwrap();
    assert_eq!(created["status"], json!(201));
    assert_eq!(created["body"], json!("created"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inherited_error_status_is_raised() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "expired"})))
        .mount(&mock_server)
        .await;

    let err = call(mock_server.uri(), "find", Value::Null).await.unwrap_err();
    match err {
        Error::Response(err) => {
            assert_eq!(err.status, 401);
            assert_eq!(err.data, json!({"error": "expired"}));
            assert_eq!(err.schema, "Pets.pets.find");
        }
        other => panic!("expected a response error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_undeclared_status_is_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;

    let err = call(mock_server.uri(), "find", Value::Null).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedResponse(ref e) if e.status() == 503));
}
