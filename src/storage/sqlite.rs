//! SQLite 题库存储
//!
//! ## 核心方法
//! - `list_questions` / `find_questions_by_category`: 按 id 升序
//! - `search_questions`: `contains_ci(question, ?1)`，与内存实现同一匹配规则
//! - `find_questions_excluding`: 已答 id 以 JSON 数组绑定，`NOT IN (SELECT value FROM json_each(?n))`

use rusqlite::{params, params_from_iter, OptionalExtension, Row, ToSql};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::{CategorySeed, QuestionStore};
use crate::database::TriviaDatabase;
use crate::error::{TriviaError, TriviaResult};
use crate::models::{Category, NewQuestion, Question};

const QUESTION_COLUMNS: &str = "id, question, answer, category, difficulty";

pub struct SqliteQuestionStore {
    db: Arc<TriviaDatabase>,
}

impl SqliteQuestionStore {
    pub fn new(db: Arc<TriviaDatabase>) -> Self {
        Self { db }
    }

    fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
        Ok(Question {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: row.get(2)?,
            category: row.get(3)?,
            difficulty: row.get(4)?,
        })
    }

    fn query_questions(
        &self,
        sql: &str,
        params: &[Box<dyn ToSql>],
    ) -> TriviaResult<Vec<Question>> {
        let conn = self.db.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(
            params_from_iter(params.iter().map(|p| p.as_ref())),
            Self::question_from_row,
        )?;
        let questions = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(questions)
    }
}

impl QuestionStore for SqliteQuestionStore {
    fn list_categories(&self) -> TriviaResult<Vec<Category>> {
        let conn = self.db.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, type FROM categories ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                kind: row.get(1)?,
            })
        })?;
        let categories = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn list_questions(&self) -> TriviaResult<Vec<Question>> {
        let sql = format!("SELECT {} FROM questions ORDER BY id ASC", QUESTION_COLUMNS);
        self.query_questions(&sql, &[])
    }

    fn get_question(&self, id: i64) -> TriviaResult<Option<Question>> {
        let conn = self.db.get_conn()?;
        let sql = format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS);
        let question = conn
            .query_row(&sql, params![id], Self::question_from_row)
            .optional()?;
        Ok(question)
    }

    fn delete_question(&self, id: i64) -> TriviaResult<()> {
        let conn = self.db.get_conn()?;
        let affected = conn.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(TriviaError::not_found(format!("question {} not found", id)));
        }
        info!("[Trivia::SqliteStore] Deleted question id={}", id);
        Ok(())
    }

    fn insert_question(&self, new_question: NewQuestion) -> TriviaResult<Question> {
        let conn = self.db.get_conn()?;
        conn.execute(
            "INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)",
            params![
                new_question.question,
                new_question.answer,
                new_question.category,
                new_question.difficulty
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(
            "[Trivia::SqliteStore] Created question id={} category={}",
            id, new_question.category
        );
        Ok(new_question.into_question(id))
    }

    fn find_questions_by_category(&self, category: i64) -> TriviaResult<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions WHERE category = ?1 ORDER BY id ASC",
            QUESTION_COLUMNS
        );
        self.query_questions(&sql, &[Box::new(category) as Box<dyn ToSql>])
    }

    fn search_questions(&self, term: &str) -> TriviaResult<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions WHERE contains_ci(question, ?1) ORDER BY id ASC",
            QUESTION_COLUMNS
        );
        let params: [Box<dyn ToSql>; 1] = [Box::new(term.to_string())];
        let questions = self.query_questions(&sql, &params)?;
        debug!(
            "[Trivia::SqliteStore] search term={:?} hits={}",
            term,
            questions.len()
        );
        Ok(questions)
    }

    fn find_questions_excluding(
        &self,
        excluded: &HashSet<i64>,
        category: Option<i64>,
    ) -> TriviaResult<Vec<Question>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(category) = category {
            params_vec.push(Box::new(category));
            conditions.push(format!("category = ?{}", params_vec.len()));
        }

        if !excluded.is_empty() {
            // 整组 id 作为一个 JSON 数组参数绑定，不受 SQLite 变量个数上限约束
            let mut ids: Vec<i64> = excluded.iter().copied().collect();
            ids.sort_unstable();
            params_vec.push(Box::new(serde_json::to_string(&ids)?));
            conditions.push(format!(
                "id NOT IN (SELECT value FROM json_each(?{}))",
                params_vec.len()
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM questions{} ORDER BY id ASC",
            QUESTION_COLUMNS, where_clause
        );
        self.query_questions(&sql, &params_vec)
    }
}

impl CategorySeed for SqliteQuestionStore {
    fn insert_category(&self, category: &Category) -> TriviaResult<()> {
        let conn = self.db.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO categories (id, type) VALUES (?1, ?2)",
            params![category.id, category.kind],
        )?;
        Ok(())
    }
}
