//! 路由解析：`(Method, path)` → `Route`
//!
//! 路径参数只接受整数，非整数按未知路径处理（404）。

use hyper::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,
    Categories,
    CategoryQuestions(i64),
    Questions,
    Question(i64),
    SearchQuestions,
    Quizzes,
}

impl Route {
    /// 解析路径，容忍首尾斜杠
    pub fn resolve(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["health"] => Some(Route::Health),
            ["categories"] => Some(Route::Categories),
            ["categories", id, "questions"] => id.parse().ok().map(Route::CategoryQuestions),
            ["questions"] => Some(Route::Questions),
            ["questions", "search"] | ["search-questions"] => Some(Route::SearchQuestions),
            ["questions", id] => id.parse().ok().map(Route::Question),
            ["quizzes"] => Some(Route::Quizzes),
            _ => None,
        }
    }

    pub fn allows(&self, method: &Method) -> bool {
        match self {
            Route::Health | Route::Categories | Route::CategoryQuestions(_) => {
                method == Method::GET
            }
            Route::Questions => method == Method::GET || method == Method::POST,
            Route::Question(_) => method == Method::DELETE,
            Route::SearchQuestions | Route::Quizzes => method == Method::POST,
        }
    }
}
