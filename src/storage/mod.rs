//! 题库存储端口
//!
//! handlers 只依赖 `QuestionStore`，不感知具体存储引擎。
//! 每次调用视为原子且立即一致；并发控制由实现自行负责。

mod memory;
mod sqlite;

pub use memory::MemoryQuestionStore;
pub use sqlite::SqliteQuestionStore;

use std::collections::HashSet;

use crate::error::TriviaResult;
use crate::models::{Category, NewQuestion, Question};

/// 题目 / 分类存储接口
pub trait QuestionStore: Send + Sync {
    /// 全部分类，按 id 升序
    fn list_categories(&self) -> TriviaResult<Vec<Category>>;

    /// 全部题目，按 id 升序
    fn list_questions(&self) -> TriviaResult<Vec<Question>>;

    fn get_question(&self, id: i64) -> TriviaResult<Option<Question>>;

    /// 删除题目；不存在时返回 `TriviaError::NotFound`
    fn delete_question(&self, id: i64) -> TriviaResult<()>;

    /// 插入题目并返回带新 id 的完整记录
    fn insert_question(&self, new_question: NewQuestion) -> TriviaResult<Question>;

    fn find_questions_by_category(&self, category: i64) -> TriviaResult<Vec<Question>>;

    /// 题干大小写不敏感子串匹配，保持存储顺序
    fn search_questions(&self, term: &str) -> TriviaResult<Vec<Question>>;

    /// 排除 `excluded` 中的 id；`category` 为 `None` 时不限分类
    fn find_questions_excluding(
        &self,
        excluded: &HashSet<i64>,
        category: Option<i64>,
    ) -> TriviaResult<Vec<Question>>;
}

/// 分类写入，仅供启动播种使用，不属于请求路径
pub trait CategorySeed {
    fn insert_category(&self, category: &Category) -> TriviaResult<()>;
}
