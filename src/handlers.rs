//! 题库请求处理
//!
//! 每个端点一个方法：校验输入 → 调用存储端口与分页/搜索/选题逻辑 → 组装响应。
//! 方法均为同步调用，HTTP 层负责放到阻塞线程池执行。
//!
//! ## 空结果约定
//! - 列表类（分类、全部题目、分类下题目、搜索）整体为空 → NotFound
//! - 分页越界只是空页，仍返回 200 与正确的 `total_questions`

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::info;

use crate::error::{TriviaError, TriviaResult};
use crate::models::{
    AddQuestionRequest, CategoriesResponse, CategoryQuestionsResponse, CreateResponse,
    DeleteResponse, HealthResponse, LenientInt, NewQuestion, Question, QuestionPageResponse,
    QuizRequest, QuizResponse, SearchRequest, SearchResponse, QUESTIONS_PER_PAGE,
};
use crate::pagination::paginate;
use crate::quiz::{self, CategoryFilter, RandomSource};
use crate::search;
use crate::storage::QuestionStore;

/// 题库 API 服务，进程启动时创建一次并在请求间共享
pub struct TriviaApi {
    store: Arc<dyn QuestionStore>,
    random: Arc<dyn RandomSource>,
}

impl TriviaApi {
    pub fn new(store: Arc<dyn QuestionStore>, random: Arc<dyn RandomSource>) -> Self {
        Self { store, random }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &dyn QuestionStore {
        self.store.as_ref()
    }

    /// GET /categories
    pub fn list_categories(&self) -> TriviaResult<CategoriesResponse> {
        let categories = self.store.list_categories()?;
        if categories.is_empty() {
            return Err(TriviaError::not_found("no categories found"));
        }
        Ok(CategoriesResponse { categories })
    }

    /// GET /questions?page=N
    pub fn list_questions(&self, page: usize) -> TriviaResult<QuestionPageResponse> {
        let questions = self.store.list_questions()?;
        if questions.is_empty() {
            return Err(TriviaError::not_found("no questions found"));
        }
        let categories = self.store.list_categories()?;

        Ok(QuestionPageResponse {
            questions: paginate(&questions, page, QUESTIONS_PER_PAGE).to_vec(),
            total_questions: questions.len(),
            categories,
            current_category: distinct_categories(&questions),
        })
    }

    /// DELETE /questions/{id}
    pub fn delete_question(&self, id: i64) -> TriviaResult<DeleteResponse> {
        self.store.delete_question(id)?;
        Ok(DeleteResponse {
            success: true,
            deleted: id,
        })
    }

    /// POST /questions
    ///
    /// 空字符串或只含空白的题干/答案按缺失处理（422）。
    pub fn add_question(&self, request: AddQuestionRequest) -> TriviaResult<CreateResponse> {
        let question = required_text(request.question, "question")?;
        let answer = required_text(request.answer, "answer")?;
        let category = required_int(request.category, "category")?;
        let difficulty = required_int(request.difficulty, "difficulty")?;

        let created = self.store.insert_question(NewQuestion {
            question,
            answer,
            category,
            difficulty,
        })?;
        info!(
            "[Trivia::Api] Question {} added to category {}",
            created.id, created.category
        );

        Ok(CreateResponse {
            success: true,
            created: created.id,
        })
    }

    /// POST /questions/search
    pub fn search_questions(&self, request: SearchRequest) -> TriviaResult<SearchResponse> {
        let term = search::require_term(request.search_term.as_deref())?;
        let questions = self.store.search_questions(term)?;
        if questions.is_empty() {
            return Err(TriviaError::not_found(format!(
                "no questions match '{}'",
                term
            )));
        }

        Ok(SearchResponse {
            success: true,
            total_questions: questions.len(),
            current_category: distinct_categories(&questions),
            questions,
        })
    }

    /// GET /categories/{id}/questions?page=N
    ///
    /// 分类是否存在不做校验，只看该分类下是否有题。
    pub fn questions_by_category(
        &self,
        category_id: i64,
        page: usize,
    ) -> TriviaResult<CategoryQuestionsResponse> {
        let questions = self.store.find_questions_by_category(category_id)?;
        if questions.is_empty() {
            return Err(TriviaError::not_found(format!(
                "no questions in category {}",
                category_id
            )));
        }

        Ok(CategoryQuestionsResponse {
            questions: paginate(&questions, page, QUESTIONS_PER_PAGE).to_vec(),
            total_questions: questions.len(),
            current_category: category_id,
        })
    }

    /// POST /quizzes
    pub fn next_quiz_question(&self, request: QuizRequest) -> TriviaResult<QuizResponse> {
        let previous: HashSet<i64> = request
            .previous_questions
            .ok_or_else(|| TriviaError::bad_request("previous_questions is required"))?
            .into_iter()
            .collect();
        let category = request
            .quiz_category
            .ok_or_else(|| TriviaError::bad_request("quiz_category is required"))?;
        let category_id = match category.id {
            Some(LenientInt::Int(id)) => id,
            Some(LenientInt::Invalid(raw)) => {
                return Err(TriviaError::bad_request(format!(
                    "quiz_category.id must be an integer, got {}",
                    raw
                )))
            }
            None => return Err(TriviaError::bad_request("quiz_category.id is required")),
        };

        let filter = CategoryFilter::from_id(category_id);
        let next = quiz::next_question(
            self.store.as_ref(),
            &previous,
            filter,
            self.random.as_ref(),
        )?;
        Ok(QuizResponse::from(next))
    }

    /// GET /health：做一次存储往返
    pub fn health(&self) -> TriviaResult<HealthResponse> {
        self.store.list_categories()?;
        Ok(HealthResponse { status: "ok" })
    }
}

/// 题目涉及的分类 id，去重并升序
fn distinct_categories(questions: &[Question]) -> Vec<i64> {
    questions
        .iter()
        .map(|q| q.category)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn required_text(value: Option<String>, field: &str) -> TriviaResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(TriviaError::unprocessable(format!("{} is required", field))),
    }
}

fn required_int(value: Option<LenientInt>, field: &str) -> TriviaResult<i64> {
    match value {
        Some(LenientInt::Int(v)) => Ok(v),
        Some(LenientInt::Invalid(raw)) => Err(TriviaError::unprocessable(format!(
            "{} must be an integer, got {}",
            field, raw
        ))),
        None => Err(TriviaError::unprocessable(format!("{} is required", field))),
    }
}
