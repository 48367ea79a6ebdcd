//! 分页工具
//!
//! 页码从 1 开始；`start = (page - 1) * page_size`，越界返回空切片而不是错误。
//! 总数始终由调用方按分页前的长度上报。

use std::num::IntErrorKind;

use crate::error::{TriviaError, TriviaResult};

/// 解析 `?page=` 查询参数
///
/// - 缺失或非数字：按第 1 页处理
/// - 数字但 < 1：视为格式错误
/// - 超出整数范围的正数：越界页（空页）
pub fn parse_page(raw: Option<&str>) -> TriviaResult<usize> {
    let Some(raw) = raw else {
        return Ok(1);
    };

    match raw.trim().parse::<i64>() {
        Ok(page) if page >= 1 => Ok(usize::try_from(page).unwrap_or(usize::MAX)),
        Ok(page) => Err(TriviaError::bad_request(format!(
            "page must be a positive integer, got {}",
            page
        ))),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => Err(TriviaError::bad_request(
            format!("page must be a positive integer, got {}", raw.trim()),
        )),
        Err(_) => Ok(1),
    }
}

/// 取第 `page` 页，不修改原序列
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
