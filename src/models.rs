//! 题库数据模型
//!
//! 包含实体（`Question` / `Category`）以及各端点的请求、响应载荷。
//! 字段命名与线上 JSON 保持一致（`total_questions`、`current_category`、
//! `searchTerm`、`previous_questions`、`quiz_category`）。

use serde::{Deserialize, Deserializer, Serialize};

/// 每页题目数量（所有分页端点统一）
pub const QUESTIONS_PER_PAGE: usize = 10;

// ============================================================================
// 实体
// ============================================================================

/// 题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// 软关联 `Category.id`，不强制引用完整性
    pub category: i64,
    pub difficulty: i64,
}

/// 分类（只读，由外部预置）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Category {
    pub fn new(id: i64, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
        }
    }
}

/// 新建题目参数（id 由存储层分配）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

impl NewQuestion {
    pub fn into_question(self, id: i64) -> Question {
        Question {
            id,
            question: self.question,
            answer: self.answer,
            category: self.category,
            difficulty: self.difficulty,
        }
    }
}

// ============================================================================
// 请求载荷
// ============================================================================
//
// 所有字段都是 Option：缺失与类型错误由 handlers 层区分并映射为 404/422，
// 反序列化本身不拒绝任何结构合法的 JSON 对象。

/// POST /questions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddQuestionRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub category: Option<LenientInt>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub difficulty: Option<LenientInt>,
}

/// POST /questions/search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default, rename = "searchTerm")]
    pub search_term: Option<String>,
}

/// POST /quizzes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub previous_questions: Option<Vec<i64>>,
    #[serde(default)]
    pub quiz_category: Option<QuizCategory>,
}

/// 问答模式的分类选择，`id == 0` 表示全部分类
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizCategory {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id: Option<LenientInt>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// 宽松整数：前端常以字符串形式提交数字（如 `"difficulty": "1"`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LenientInt {
    Int(i64),
    /// 存在但无法解析为整数，保留原始文本用于错误信息
    Invalid(String),
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<LenientInt>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => LenientInt::Int(i),
            None => LenientInt::Invalid(n.to_string()),
        },
        serde_json::Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => LenientInt::Int(i),
            Err(_) => LenientInt::Invalid(s),
        },
        other => LenientInt::Invalid(other.to_string()),
    }))
}

// ============================================================================
// 响应载荷
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// GET /questions
#[derive(Debug, Clone, Serialize)]
pub struct QuestionPageResponse {
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub categories: Vec<Category>,
    /// 全部题目涉及的分类 id（去重、升序）
    pub current_category: Vec<i64>,
}

/// GET /categories/{id}/questions
#[derive(Debug, Clone, Serialize)]
pub struct CategoryQuestionsResponse {
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub current_category: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub current_category: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    /// 新分配的 id，便于客户端回查
    pub created: i64,
}

/// POST /quizzes：有题时返回题目，题目耗尽时返回 `false`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResponse {
    pub question: QuizQuestion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuizQuestion {
    Next(Question),
    Exhausted(bool),
}

impl From<Option<Question>> for QuizResponse {
    fn from(question: Option<Question>) -> Self {
        Self {
            question: match question {
                Some(q) => QuizQuestion::Next(q),
                None => QuizQuestion::Exhausted(false),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
