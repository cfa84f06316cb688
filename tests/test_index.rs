mod common;

use std::collections::HashMap;

use serde_json::json;
use vikingdb::model::{
    AggRequest, FetchDataInIndexRequest, IndexLocator, RecallBase, ScalarOrder, SearchBase,
    SearchByIdRequest, SearchByKeywordsRequest, SearchByMultiModalRequest, SearchByRandomRequest,
    SearchByScalarRequest, SearchByVectorRequest,
};
use vikingdb::RequestOptions;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_result() -> serde_json::Value {
    json!({
        "data": [
            {"id": 1, "fields": {"title": "Dune"}, "score": 47, "ann_score": 0.5},
            {"id": "b-2", "fields": {"title": "Emma"}, "score": 0.25, "ann_score": 0.25}
        ],
        "filter_matched_count": 10,
        "total_return_count": 2,
        "real_text_query": "dune"
    })
}

async fn mount_search(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(route))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::ok_body(
            "search",
            "r-search",
            search_result(),
        )))
        .expect(1)
        .mount(server)
        .await;
}

fn locator() -> IndexLocator {
    IndexLocator::new("books", "books_idx")
}

#[tokio::test]
async fn search_by_vector_sends_flat_envelope() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "/api/vikingdb/data/search/vector",
        json!({
            "collection_name": "books",
            "index_name": "books_idx",
            "limit": 2,
            "output_fields": ["title"],
            "dense_vector": [0.5, 0.25],
            "sparse_vector": {"dune": 0.75}
        }),
    )
    .await;

    let index = common::client(&server).index(locator());
    let mut search = SearchBase::with_limit(2);
    search.output_fields = vec!["title".to_string()];
    let request = SearchByVectorRequest {
        search,
        dense_vector: vec![0.5, 0.25],
        sparse_vector: Some(HashMap::from([("dune".to_string(), 0.75)])),
    };
    let response = index
        .search_by_vector(&request, &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.request_id, "r-search");
    let result = response.result.unwrap();
    assert_eq!(result.filter_matched_count, 10);
    assert_eq!(result.total_return_count, 2);
    assert_eq!(result.real_text_query, "dune");
    assert_eq!(result.data[0].score, 47.0);
    assert_eq!(result.data[0].id.as_i64(), Some(1));
    assert_eq!(result.data[1].id, json!("b-2"));
}

#[tokio::test]
async fn search_by_multi_modal_hits_its_path() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "/api/vikingdb/data/search/multi_modal",
        json!({
            "collection_name": "books",
            "index_name": "books_idx",
            "limit": 3,
            "text": "desert planet",
            "need_instruction": true
        }),
    )
    .await;

    let request = SearchByMultiModalRequest {
        search: SearchBase::with_limit(3),
        text: Some("desert planet".to_string()),
        need_instruction: Some(true),
        ..Default::default()
    };
    common::client(&server)
        .index(locator())
        .search_by_multi_modal(&request, &RequestOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn search_by_id_hits_its_path() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "/api/vikingdb/data/search/id",
        json!({"collection_name": "books", "index_name": "books_idx", "id": 1}),
    )
    .await;

    let request = SearchByIdRequest {
        search: SearchBase::default(),
        id: json!(1),
    };
    common::client(&server)
        .index(locator())
        .search_by_id(&request, &RequestOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn search_by_scalar_hits_its_path() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "/api/vikingdb/data/search/scalar",
        json!({
            "collection_name": "books",
            "index_name": "books_idx",
            "limit": 5,
            "field": "year",
            "order": "desc"
        }),
    )
    .await;

    let request = SearchByScalarRequest {
        search: SearchBase::with_limit(5),
        field: Some("year".to_string()),
        order: Some(ScalarOrder::Desc),
    };
    common::client(&server)
        .index(locator())
        .search_by_scalar(&request, &RequestOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn search_by_keywords_hits_its_path() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "/api/vikingdb/data/search/keywords",
        json!({
            "collection_name": "books",
            "index_name": "books_idx",
            "limit": 4,
            "keywords": ["spice", "sand"],
            "case_sensitive": true
        }),
    )
    .await;

    let request = SearchByKeywordsRequest {
        search: SearchBase::with_limit(4),
        keywords: vec!["spice".to_string(), "sand".to_string()],
        query: None,
        case_sensitive: true,
    };
    common::client(&server)
        .index(locator())
        .search_by_keywords(&request, &RequestOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn search_by_random_hits_its_path() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "/api/vikingdb/data/search/random",
        json!({
            "collection_name": "books",
            "index_name": "books_idx",
            "limit": 1,
            "partition": "2024"
        }),
    )
    .await;

    let mut search = SearchBase::with_limit(1);
    search.recall.partition = Some("2024".to_string());
    common::client(&server)
        .index(locator())
        .search_by_random(&SearchByRandomRequest { search }, &RequestOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn fetch_in_index_returns_vectors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/vikingdb/data/fetch_in_index"))
        .and(body_json(json!({
            "collection_name": "books",
            "index_name": "books_idx",
            "ids": [1, 9]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::ok_body(
            "fetch_in_index",
            "r-fetch",
            json!({
                "fetch": [{"id": 1, "fields": {}, "dense_dim": 2, "dense_vector": [0.5, 1.5]}],
                "ids_not_exist": [9]
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let request = FetchDataInIndexRequest {
        ids: vec![json!(1), json!(9)],
        ..Default::default()
    };
    let result = common::client(&server)
        .index(locator())
        .fetch(&request, &RequestOptions::new())
        .await
        .unwrap()
        .result
        .unwrap();
    assert_eq!(result.items[0].item.id, json!(1));
    assert_eq!(result.items[0].dense_dim, Some(2));
    assert_eq!(result.items[0].dense_vector, vec![0.5, 1.5]);
    assert_eq!(result.not_found_ids, vec![json!(9)]);
}

#[tokio::test]
async fn aggregate_decodes_groups() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/vikingdb/data/agg"))
        .and(body_json(json!({
            "collection_name": "books",
            "index_name": "books_idx",
            "filter": {"op": "must", "field": "lang", "conds": ["en"]},
            "op": "count",
            "field": "genre"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::ok_body(
            "agg",
            "r-agg",
            json!({"agg": {"scifi": 3, "drama": 1}, "op": "count", "field": "genre"}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let request = AggRequest {
        recall: RecallBase {
            filter: Some(common::fields(
                json!({"op": "must", "field": "lang", "conds": ["en"]}),
            )),
            partition: None,
        },
        op: "count".to_string(),
        field: Some("genre".to_string()),
        ..Default::default()
    };
    let index = common::client(&server).index(locator());
    assert_eq!(index.index_name(), "books_idx");
    assert_eq!(index.collection_name(), "books");

    let result = index
        .aggregate(&request, &RequestOptions::new())
        .await
        .unwrap()
        .result
        .unwrap();
    assert_eq!(result.op, "count");
    assert_eq!(result.field, "genre");
    assert_eq!(result.agg["scifi"].as_u64(), Some(3));
}
