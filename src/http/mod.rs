//! HTTP 传输层（hyper）
//!
//! 路由、JSON 编解码、CORS 头与优雅退出；业务逻辑全部在 `handlers`。

pub mod router;
pub mod server;

pub use router::Route;
pub use server::{bind, handle_request, serve, ServerState};
