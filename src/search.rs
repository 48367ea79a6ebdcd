//! 题目全文检索：大小写不敏感的子串匹配
//!
//! SQLite 的 `LIKE` 只对 ASCII 做大小写折叠，这里统一用 Unicode 小写比较，
//! 并通过 `contains_ci` 标量函数注册到连接上，使两种存储实现的匹配规则一致。

use crate::error::{TriviaError, TriviaResult};
use crate::models::Question;

/// `text` 是否包含 `term`（大小写不敏感）
pub fn matches(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    text.to_lowercase().contains(&term.to_lowercase())
}

/// 按存储顺序过滤题干匹配的题目
pub fn search(corpus: &[Question], term: &str) -> Vec<Question> {
    let needle = term.to_lowercase();
    corpus
        .iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// 校验搜索词：缺失和空字符串都是调用方错误，避免误匹配全表
pub fn require_term(term: Option<&str>) -> TriviaResult<&str> {
    match term {
        Some(t) if !t.is_empty() => Ok(t),
        Some(_) => Err(TriviaError::bad_request("searchTerm must not be empty")),
        None => Err(TriviaError::bad_request("searchTerm is required")),
    }
}
