use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use hyper::body::HttpBody;
use hyper::header::{self, HeaderValue};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};

use super::router::Route;
use crate::error::{TriviaError, TriviaResult};
use crate::handlers::TriviaApi;
use crate::pagination::parse_page;

const ALLOW_HEADERS: &str = "Content-Type,Authorization,true";
const ALLOW_METHODS: &str = "GET,PATCH,POST,DELETE,OPTIONS";

/// 请求间共享的服务状态
pub struct ServerState {
    api: Arc<TriviaApi>,
    allowed_origin: HeaderValue,
    max_body_bytes: usize,
}

impl ServerState {
    pub fn new(api: Arc<TriviaApi>, allowed_origin: &str, max_body_bytes: usize) -> Self {
        let allowed_origin = HeaderValue::from_str(allowed_origin).unwrap_or_else(|_| {
            warn!(
                "[Trivia::Http] Invalid allowed_origin {:?}, falling back to *",
                allowed_origin
            );
            HeaderValue::from_static("*")
        });
        Self {
            api,
            allowed_origin,
            max_body_bytes,
        }
    }
}

/// 绑定监听地址；返回实际地址和服务 future（收到 `shutdown` 后优雅退出）
pub fn bind<F>(
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown: F,
) -> Result<(SocketAddr, impl Future<Output = Result<()>>)>
where
    F: Future<Output = ()>,
{
    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle_request(state.clone(), req))) }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("绑定监听地址失败: {}", addr))?
        .serve(make_svc);
    let local_addr = server.local_addr();
    info!("[Trivia::Http] Listening on http://{}", local_addr);

    let running = async move {
        server
            .with_graceful_shutdown(shutdown)
            .await
            .context("http server错误")
    };
    Ok((local_addr, running))
}

/// 绑定并运行直到 `shutdown` 完成
pub async fn serve<F>(addr: SocketAddr, state: Arc<ServerState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let (_, running) = bind(addr, state, shutdown)?;
    running.await?;
    info!("[Trivia::Http] Server stopped");
    Ok(())
}

/// 单个请求入口：所有错误都在这里转换为统一错误体
pub async fn handle_request(
    state: Arc<ServerState>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = if method == Method::OPTIONS {
        preflight_response(&state.allowed_origin)
    } else {
        match route_request(&state, req).await {
            Ok(payload) => json_response(StatusCode::OK, &payload, &state.allowed_origin),
            Err(err) => {
                if err.status_code() >= 500 {
                    error!("[Trivia::Http] {} {} failed: {}", method, path, err);
                }
                error_response(&err, &state.allowed_origin)
            }
        }
    };

    info!(
        "[Trivia::Http] {} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    Ok(response)
}

async fn route_request(
    state: &ServerState,
    req: Request<Body>,
) -> TriviaResult<serde_json::Value> {
    let route = Route::resolve(req.uri().path()).ok_or_else(|| {
        TriviaError::not_found(format!("no resource at {}", req.uri().path()))
    })?;
    if !route.allows(req.method()) {
        return Err(TriviaError::MethodNotAllowed);
    }

    let method = req.method().clone();
    let page = match route {
        Route::Questions | Route::CategoryQuestions(_) if method == Method::GET => {
            parse_page(query_param(&req, "page").as_deref())?
        }
        _ => 1,
    };

    let body = if method == Method::POST {
        if let Some(len) = content_length(&req) {
            if len > state.max_body_bytes {
                return Err(TriviaError::PayloadTooLarge {
                    limit: state.max_body_bytes,
                });
            }
        }
        read_body(req.into_body(), state.max_body_bytes).await?
    } else {
        Vec::new()
    };

    let api = state.api.clone();
    tokio::task::spawn_blocking(move || dispatch(&api, route, &method, page, &body))
        .await
        .map_err(|e| TriviaError::internal(format!("handler task failed: {}", e)))?
}

/// 同步分发到 `TriviaApi`
fn dispatch(
    api: &TriviaApi,
    route: Route,
    method: &Method,
    page: usize,
    body: &[u8],
) -> TriviaResult<serde_json::Value> {
    match route {
        Route::Health => to_json(api.health()?),
        Route::Categories => to_json(api.list_categories()?),
        Route::CategoryQuestions(category_id) => {
            to_json(api.questions_by_category(category_id, page)?)
        }
        Route::Questions if method == Method::POST => {
            to_json(api.add_question(parse_write_body(body)?)?)
        }
        Route::Questions => to_json(api.list_questions(page)?),
        Route::Question(id) => to_json(api.delete_question(id)?),
        Route::SearchQuestions => to_json(api.search_questions(parse_body(body)?)?),
        Route::Quizzes => to_json(api.next_quiz_question(parse_body(body)?)?),
    }
}

fn to_json<T: Serialize>(value: T) -> TriviaResult<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

/// 读取型请求体：任何解析失败都属于格式错误
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> TriviaResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| TriviaError::bad_request(format!("malformed request body: {}", e)))
}

/// 写入型请求体：JSON 合法但字段类型不对视为 422
fn parse_write_body<T: DeserializeOwned>(body: &[u8]) -> TriviaResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        if e.is_data() {
            TriviaError::unprocessable(format!("invalid field: {}", e))
        } else {
            TriviaError::bad_request(format!("malformed request body: {}", e))
        }
    })
}

async fn read_body(mut body: Body, limit: usize) -> TriviaResult<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk =
            chunk.map_err(|e| TriviaError::bad_request(format!("failed to read body: {}", e)))?;
        if buf.len() + chunk.len() > limit {
            return Err(TriviaError::PayloadTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn content_length(req: &Request<Body>) -> Option<usize> {
    req.headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn query_param(req: &Request<Body>, name: &str) -> Option<String> {
    let query = req.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn with_cors(
    builder: hyper::http::response::Builder,
    origin: &HeaderValue,
) -> hyper::http::response::Builder {
    builder
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone())
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS)
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
}

fn json_response<T: Serialize>(
    status: StatusCode,
    payload: &T,
    origin: &HeaderValue,
) -> Response<Body> {
    let bytes = serde_json::to_vec(payload).unwrap_or_else(|_| b"{}".to_vec());
    with_cors(Response::builder().status(status), origin)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .unwrap_or_else(|_| Response::new(Body::from("response build failed")))
}

fn error_response(err: &TriviaError, origin: &HeaderValue) -> Response<Body> {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, &err.to_body(), origin)
}

fn preflight_response(origin: &HeaderValue) -> Response<Body> {
    with_cors(Response::builder().status(StatusCode::NO_CONTENT), origin)
        .body(Body::empty())
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
