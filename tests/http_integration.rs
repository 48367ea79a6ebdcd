//! HTTP 层集成测试：直接调用 service 函数，覆盖路由、状态码与响应体形状

use hyper::{Body, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use trivia_api_lib::database::TriviaDatabase;
use trivia_api_lib::handlers::TriviaApi;
use trivia_api_lib::http::{handle_request, ServerState};
use trivia_api_lib::models::{Category, NewQuestion};
use trivia_api_lib::quiz::SeededRandom;
use trivia_api_lib::storage::{CategorySeed, QuestionStore, SqliteQuestionStore};

const MAX_BODY: usize = 1024;

fn state_with(categories: &[(i64, &str)], questions: &[(&str, &str, i64, i64)]) -> Arc<ServerState> {
    let db = TriviaDatabase::new_in_memory().expect("memory db");
    let store = SqliteQuestionStore::new(Arc::new(db));
    for (id, name) in categories {
        store.insert_category(&Category::new(*id, *name)).unwrap();
    }
    for (question, answer, category, difficulty) in questions {
        store
            .insert_question(NewQuestion {
                question: question.to_string(),
                answer: answer.to_string(),
                category: *category,
                difficulty: *difficulty,
            })
            .unwrap();
    }
    let api = TriviaApi::new(Arc::new(store), Arc::new(SeededRandom::new(1)));
    Arc::new(ServerState::new(Arc::new(api), "*", MAX_BODY))
}

fn science_state() -> Arc<ServerState> {
    state_with(&[(1, "Science")], &[("Q1", "A1", 1, 3)])
}

fn numbered_state(count: usize) -> Arc<ServerState> {
    let texts: Vec<String> = (1..=count).map(|i| format!("Question {}", i)).collect();
    let questions: Vec<(&str, &str, i64, i64)> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), "answer", (i % 3) as i64 + 1, 2))
        .collect();
    state_with(&[(1, "Science"), (2, "Art"), (3, "Geography")], &questions)
}

async fn call(
    state: &Arc<ServerState>,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
        None => Body::empty(),
    };
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let resp = handle_request(state.clone(), req).await.unwrap();
    let status = resp.status();
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_category_questions_end_to_end() {
    let state = science_state();
    let (status, body) = call(&state, Method::GET, "/categories/1/questions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "questions": [{"id": 1, "question": "Q1", "answer": "A1", "category": 1, "difficulty": 3}],
            "total_questions": 1,
            "current_category": 1
        })
    );
}

#[tokio::test]
async fn test_categories_list_and_empty_store() {
    let state = science_state();
    let (status, body) = call(&state, Method::GET, "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"categories": [{"id": 1, "type": "Science"}]}));

    let empty = state_with(&[], &[]);
    let (status, body) = call(&empty, Method::GET, "/categories", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!(404));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_questions_are_paginated() {
    let state = numbered_state(25);

    let (status, body) = call(&state, Method::GET, "/questions?page=3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);
    assert_eq!(body["questions"][0]["id"], json!(21));
    assert_eq!(body["total_questions"], json!(25));
    assert_eq!(body["categories"].as_array().unwrap().len(), 3);
    assert_eq!(body["current_category"], json!([1, 2, 3]));

    let (status, body) = call(&state, Method::GET, "/questions?page=99", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["questions"].as_array().unwrap().is_empty());
    assert_eq!(body["total_questions"], json!(25));

    // 非数字页码按第 1 页处理
    let (_, body) = call(&state, Method::GET, "/questions?page=abc", None).await;
    assert_eq!(body["questions"][0]["id"], json!(1));

    let (status, _) = call(&state, Method::GET, "/questions?page=0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 超出整数范围的页码按越界处理
    let (status, body) = call(&state, Method::GET, "/questions?page=99999999999999999999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["questions"].as_array().unwrap().is_empty());
    assert_eq!(body["total_questions"], json!(25));
}

#[tokio::test]
async fn test_empty_question_store_is_not_found() {
    let state = state_with(&[(1, "Science")], &[]);
    let (status, body) = call(&state, Method::GET, "/questions", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!(404));
}

#[tokio::test]
async fn test_delete_question_lifecycle() {
    let state = science_state();
    let (status, body) = call(&state, Method::DELETE, "/questions/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "deleted": 1}));

    let (status, body) = call(&state, Method::DELETE, "/questions/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_add_question_validation() {
    let state = science_state();

    let (status, body) = call(
        &state,
        Method::POST,
        "/questions",
        Some(json!({"question": "q1", "answer": "a1", "difficulty": "1", "category": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let created = body["created"].as_i64().unwrap();

    let (_, page) = call(&state, Method::GET, "/questions", None).await;
    let stored = page["questions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["id"] == json!(created))
        .cloned()
        .unwrap();
    assert_eq!(stored["difficulty"], json!(1));

    let (status, body) = call(
        &state,
        Method::POST,
        "/questions",
        Some(json!({"answer": "a1", "difficulty": 1, "category": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], json!(422));

    let (status, _) = call(
        &state,
        Method::POST,
        "/questions",
        Some(json!({"question": "", "answer": "a1", "difficulty": 1, "category": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // 字段类型错误同样是 422
    let (status, _) = call(
        &state,
        Method::POST,
        "/questions",
        Some(json!({"question": 5, "answer": "a1", "difficulty": 1, "category": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // 不是 JSON：格式错误 → 404
    let req = Request::builder()
        .method(Method::POST)
        .uri("/questions")
        .body(Body::from("not json"))
        .unwrap();
    let resp = handle_request(state.clone(), req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_questions() {
    let state = state_with(
        &[(1, "Geography")],
        &[("Everest height?", "8848", 1, 2), ("K2 height?", "8611", 3, 2)],
    );

    for term in ["e", "E"] {
        let (status, body) = call(
            &state,
            Method::POST,
            "/questions/search",
            Some(json!({ "searchTerm": term })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["total_questions"], json!(2));
        assert_eq!(body["current_category"], json!([1, 3]));
    }

    let (status, body) = call(
        &state,
        Method::POST,
        "/search-questions",
        Some(json!({"searchTerm": "everest"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"][0]["answer"], json!("8848"));

    let (status, _) = call(&state, Method::POST, "/questions/search", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &state,
        Method::POST,
        "/questions/search",
        Some(json!({"searchTerm": "nothing like this"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quiz_flow_until_exhausted() {
    let state = numbered_state(6);
    let mut previous: Vec<i64> = Vec::new();

    // 分类 2 中的题目：id 2、5
    for _ in 0..2 {
        let (status, body) = call(
            &state,
            Method::POST,
            "/quizzes",
            Some(json!({"previous_questions": previous, "quiz_category": {"id": 2, "type": "Art"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let question = &body["question"];
        assert_eq!(question["category"], json!(2));
        let id = question["id"].as_i64().unwrap();
        assert!(!previous.contains(&id));
        assert!(question["answer"].is_string());
        previous.push(id);
    }

    let (status, body) = call(
        &state,
        Method::POST,
        "/quizzes",
        Some(json!({"previous_questions": previous, "quiz_category": {"id": 2, "type": "Art"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"question": false}));

    // id 0 表示全部分类
    let (_, body) = call(
        &state,
        Method::POST,
        "/quizzes",
        Some(json!({"previous_questions": [1, 2, 3, 4, 5], "quiz_category": {"id": 0, "type": "click"}})),
    )
    .await;
    assert_eq!(body["question"]["id"], json!(6));
}

#[tokio::test]
async fn test_quiz_missing_fields_is_not_found() {
    let state = numbered_state(3);
    let (status, body) = call(
        &state,
        Method::POST,
        "/quizzes",
        Some(json!({"quiz_category": {"id": 0}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));

    let (status, _) = call(
        &state,
        Method::POST,
        "/quizzes",
        Some(json!({"previous_questions": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_routing_errors_and_cors() {
    let state = science_state();

    let (status, body) = call(&state, Method::GET, "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!(404));

    let (status, body) = call(&state, Method::GET, "/quizzes", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], json!(405));

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/questions")
        .body(Body::empty())
        .unwrap();
    let resp = handle_request(state.clone(), req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        resp.headers()["access-control-allow-methods"],
        "GET,PATCH,POST,DELETE,OPTIONS"
    );

    let req = Request::builder()
        .uri("/categories")
        .body(Body::empty())
        .unwrap();
    let resp = handle_request(state.clone(), req).await.unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["content-type"], "application/json");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let state = science_state();
    let huge = "x".repeat(MAX_BODY * 2);
    let (status, body) = call(
        &state,
        Method::POST,
        "/questions",
        Some(json!({"question": huge, "answer": "a", "category": 1, "difficulty": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], json!(413));
}

#[tokio::test]
async fn test_health_check() {
    let state = science_state();
    let (status, body) = call(&state, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_serves_over_tcp_and_shuts_down() {
    let state = science_state();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let (addr, running) = trivia_api_lib::http::bind(
        "127.0.0.1:0".parse().unwrap(),
        state,
        async move {
            rx.await.ok();
        },
    )
    .unwrap();
    let server = tokio::spawn(running);

    let client = hyper::Client::new();
    let uri: hyper::Uri = format!("http://{}/categories/1/questions", addr).parse().unwrap();
    let resp = client.get(uri).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total_questions"], json!(1));

    tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
