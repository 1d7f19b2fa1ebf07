//! HTTP behaviour of `ApiClient` against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wvui_client::{ApiClient, ClientConfig};
use wvui_core::{ClassDefinition, DataObject, ObjectQuery, PropertyDefinition, WvError};

fn meta_body() -> serde_json::Value {
    json!({
        "hostname": "http://[::]:8080",
        "version": "1.24.1",
        "modules": {"text2vec-openai": {"name": "text2vec-openai"}}
    })
}

async fn mount_healthy(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"links": []})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(meta_body()))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::new(server.uri())).unwrap()
}

mod connection_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_check_connection_reports_meta() {
        let server = MockServer::start().await;
        mount_healthy(&server).await;
        let client = client_for(&server);

        let status = client.check_connection().await;

        assert!(status.connected);
        assert_eq!(status.url, server.uri());
        assert_eq!(status.version(), Some("1.24.1"));
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_failed_status() {
        let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();

        let status = client.check_connection().await;

        assert!(!status.connected);
        assert_eq!(status.url, "http://127.0.0.1:1");
        assert!(!status.error.unwrap_or_default().is_empty());
        assert!(status.meta.is_none());
    }

    #[tokio::test]
    async fn test_check_connection_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;
        let client = ApiClient::new(
            ClientConfig::new(server.uri()).with_timeout(Duration::from_millis(200)),
        )
        .unwrap();

        let status = client.check_connection().await;

        assert!(!status.connected);
        assert!(status.error.unwrap().starts_with("Timeout"));
    }

    #[tokio::test]
    async fn test_meta_failure_fails_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/meta"))
            .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
            .mount(&server)
            .await;

        let status = client_for(&server).check_connection().await;

        assert!(!status.connected);
        assert!(status.error.unwrap().contains("warming up"));
    }

    #[tokio::test]
    async fn test_api_key_sent_as_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/meta"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(meta_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(
            ClientConfig::new(server.uri()).with_api_key(Some("secret".into())),
        )
        .unwrap();
        let meta = client.get_meta().await.unwrap();

        assert_eq!(meta.version, "1.24.1");
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_key() {
        let server = MockServer::start().await;
        mount_healthy(&server).await;

        client_for(&server).get_meta().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
        assert_eq!(
            requests[0].headers.get("content-type").unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_reconfigured_client_uses_new_target_and_key() {
        let old = MockServer::start().await;
        let new = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/meta"))
            .and(header("authorization", "Bearer next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(meta_body()))
            .expect(1)
            .mount(&new)
            .await;

        let client = client_for(&old);
        client.update_connection(&new.uri(), Some("next".into())).unwrap();
        client.get_meta().await.unwrap();

        assert_eq!(client.generation(), 1);
        assert!(old.received_requests().await.unwrap().is_empty());
    }
}

mod schema_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_get_schema() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/schema"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "classes": [{
                    "class": "Article",
                    "vectorizer": "none",
                    "properties": [{"name": "title", "dataType": ["text"]}]
                }]
            })))
            .mount(&server)
            .await;

        let schema = client_for(&server).get_schema().await.unwrap();

        let article = schema.class("Article").unwrap();
        assert_eq!(article.properties.as_ref().unwrap()[0].name, "title");
        assert_eq!(article.extra.get("vectorizer"), Some(&json!("none")));
    }

    #[tokio::test]
    async fn test_create_class_posts_definition() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/schema"))
            .and(body_json(json!({
                "class": "Article",
                "properties": [{"name": "title", "dataType": ["text"]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"class": "Article"})))
            .expect(1)
            .mount(&server)
            .await;

        let class =
            ClassDefinition::new("Article").with_property(PropertyDefinition::new("title", "text"));
        client_for(&server).create_class(&class).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_class_conflict_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/schema"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "error": [{"message": "class name \"Article\" already exists"}]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_class(&ClassDefinition::new("Article"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(422));
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_delete_class() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/schema/Article"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_class("Article").await.unwrap();
    }

    #[tokio::test]
    async fn test_schema_call_against_unreachable_backend_fails() {
        let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();

        let err = client.get_schema().await.unwrap_err();

        assert!(matches!(err, WvError::Connection(_)));
    }
}

mod object_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_get_objects_sends_paging_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/objects"))
            .and(query_param("class", "Article"))
            .and(query_param("limit", "25"))
            .and(query_param("offset", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objects": [{"id": "a1", "class": "Article", "properties": {"title": "Hi"}}],
                "totalResults": 51
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server)
            .get_objects(&ObjectQuery::for_class("Article").page(2, 25))
            .await
            .unwrap();

        assert_eq!(page.total_results, Some(51));
        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].properties["title"], json!("Hi"));
    }

    #[tokio::test]
    async fn test_get_objects_tolerates_missing_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/objects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let page = client_for(&server)
            .get_objects(&ObjectQuery::default())
            .await
            .unwrap();

        assert!(page.objects.is_empty());
        assert_eq!(page.total_results, None);
    }

    #[tokio::test]
    async fn test_object_paths_with_and_without_class() {
        let server = MockServer::start().await;
        let body = json!({"id": "a1", "class": "Article", "properties": {}});
        Mock::given(method("GET"))
            .and(path("/v1/objects/Article/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1/objects/a1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let object = client.get_object("a1", Some("Article")).await.unwrap();
        assert_eq!(object.id.as_deref(), Some("a1"));
        client.delete_object("a1", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_object_is_http_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/objects/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_object("missing", None)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_create_and_update_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/objects"))
            .and(body_json(json!({"class": "Article", "properties": {"title": "Hi"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "new-id", "class": "Article", "properties": {"title": "Hi"},
                "creationTimeUnix": 1700000000000u64
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v1/objects/new-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "new-id", "class": "Article", "properties": {"title": "Bye"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let created = client
            .create_object(&DataObject::new("Article").with_property("title", json!("Hi")))
            .await
            .unwrap();
        assert_eq!(created.id.as_deref(), Some("new-id"));
        assert_eq!(created.creation_time_unix, Some(1_700_000_000_000));

        let updated = client
            .update_object(
                "new-id",
                &DataObject::new("Article").with_property("title", json!("Bye")),
            )
            .await
            .unwrap();
        assert_eq!(updated.properties["title"], json!("Bye"));
    }

    #[tokio::test]
    async fn test_batch_create_returns_per_object_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/batch/objects"))
            .and(body_json(json!({"objects": [
                {"class": "Article", "properties": {"title": "a"}},
                {"class": "Article", "properties": {"title": "b"}}
            ]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "1", "class": "Article", "result": {}},
                {"id": "2", "class": "Article", "result": {"errors": {"error": [{"message": "bad vector"}]}}}
            ])))
            .mount(&server)
            .await;

        let results = client_for(&server)
            .batch_create(&[
                DataObject::new("Article").with_property("title", json!("a")),
                DataObject::new("Article").with_property("title", json!("b")),
            ])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_success());
        assert_eq!(results[1].errors(), vec!["bad vector".to_string()]);
    }
}

mod graphql_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_graphql_data_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .and(body_json(json!({"query": "{ Get { Article { title } } }"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"Get": {"Article": [{"title": "Hi"}]}}
            })))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .graphql_query("{ Get { Article { title } } }", None)
            .await;

        assert!(!response.has_errors());
        assert_eq!(
            response.data.unwrap()["Get"]["Article"][0]["title"],
            json!("Hi")
        );
    }

    #[tokio::test]
    async fn test_graphql_errors_returned_as_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{
                    "message": "Cannot query field \"Nope\" on type \"GetObjectsObj\".",
                    "locations": [{"line": 1, "column": 9}]
                }]
            })))
            .mount(&server)
            .await;

        let response = client_for(&server).graphql_query("{ Get { Nope } }", None).await;

        let errors = response.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Nope"));
        assert_eq!(errors[0].locations.as_ref().unwrap()[0].line, 1);
    }

    #[tokio::test]
    async fn test_graphql_variables_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .and(body_json(json!({"query": "q", "variables": {"limit": 3}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let mut variables = serde_json::Map::new();
        variables.insert("limit".into(), json!(3));
        let response = client_for(&server).graphql_query("q", Some(variables)).await;

        assert!(response.errors.is_none());
    }

    #[tokio::test]
    async fn test_graphql_transport_failure_folded_into_errors() {
        let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();

        let response = client.graphql_query("{ Get { Article { title } } }", None).await;

        assert!(response.data.is_none());
        assert!(response.has_errors());
    }

    #[tokio::test]
    async fn test_graphql_http_error_without_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": [{"message": "anonymous access not enabled"}]
            })))
            .mount(&server)
            .await;

        let response = client_for(&server).graphql_query("{ x }", None).await;

        let message = &response.errors.unwrap()[0].message;
        assert!(message.contains("401"));
        assert!(message.contains("anonymous access not enabled"));
    }

    #[tokio::test]
    async fn test_search_objects_runs_like_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"Get": {"Article": [{"_additional": {"id": "a1", "score": "0.9"}}]}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .search_objects("vector \"db\"", "Article", 5)
            .await;
        assert!(!response.has_errors());

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let query = body["query"].as_str().unwrap();
        assert!(query.contains("Article("));
        assert!(query.contains("limit: 5"));
        assert!(query.contains(r#"valueText: "vector \"db\"""#));
    }

    #[tokio::test]
    async fn test_search_with_invalid_class_never_hits_backend() {
        let server = MockServer::start().await;

        let response = client_for(&server)
            .search_objects("x", "bad class", 5)
            .await;

        assert!(response.has_errors());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

mod monitor_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wvui_connection::{ProbeOutcome, StatusMonitor};

    #[tokio::test]
    async fn test_probe_of_previous_target_is_discarded() {
        let slow = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&slow)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/meta"))
            .respond_with(ResponseTemplate::new(200).set_body_json(meta_body()))
            .mount(&slow)
            .await;
        let fast = MockServer::start().await;
        mount_healthy(&fast).await;

        let client = Arc::new(client_for(&slow));
        let monitor = Arc::new(StatusMonitor::with_defaults(client.clone()));

        let stale = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.probe_now().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(monitor.is_probing());

        client.update_connection(&fast.uri(), None).unwrap();

        assert_eq!(stale.await.unwrap(), ProbeOutcome::Discarded);
        assert!(monitor.status().is_none());

        let outcome = monitor.probe_now().await;
        let ProbeOutcome::Published(status) = outcome else {
            panic!("expected a published status, got {:?}", outcome);
        };
        assert!(status.connected);
        assert_eq!(status.url, fast.uri());
        assert_eq!(monitor.status(), Some(status));
    }

    #[tokio::test]
    async fn test_unreachable_target_published_as_disconnected() {
        let client = Arc::new(ApiClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap());
        let monitor = StatusMonitor::with_defaults(client);

        monitor.probe_now().await;

        let status = monitor.status().unwrap();
        assert!(!status.connected);
        assert_eq!(status.url, "http://127.0.0.1:1");
    }
}
