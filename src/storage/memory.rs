//! 进程内题库存储
//!
//! 不落盘，进程退出即丢失；适合演示环境和测试。
//! id 从 1 单调递增，删除后不复用。

use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use super::{CategorySeed, QuestionStore};
use crate::error::{TriviaError, TriviaResult};
use crate::models::{Category, NewQuestion, Question};
use crate::search;

#[derive(Default)]
struct MemoryState {
    categories: BTreeMap<i64, Category>,
    questions: BTreeMap<i64, Question>,
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryQuestionStore {
    state: RwLock<MemoryState>,
}

impl MemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("[Trivia::MemoryStore] RwLock poisoned (read), recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("[Trivia::MemoryStore] RwLock poisoned (write), recovering");
            poisoned.into_inner()
        })
    }

    fn filtered<F>(&self, predicate: F) -> Vec<Question>
    where
        F: Fn(&Question) -> bool,
    {
        self.read()
            .questions
            .values()
            .filter(|q| predicate(q))
            .cloned()
            .collect()
    }
}

impl QuestionStore for MemoryQuestionStore {
    fn list_categories(&self) -> TriviaResult<Vec<Category>> {
        Ok(self.read().categories.values().cloned().collect())
    }

    fn list_questions(&self) -> TriviaResult<Vec<Question>> {
        Ok(self.read().questions.values().cloned().collect())
    }

    fn get_question(&self, id: i64) -> TriviaResult<Option<Question>> {
        Ok(self.read().questions.get(&id).cloned())
    }

    fn delete_question(&self, id: i64) -> TriviaResult<()> {
        match self.write().questions.remove(&id) {
            Some(_) => {
                info!("[Trivia::MemoryStore] Deleted question id={}", id);
                Ok(())
            }
            None => Err(TriviaError::not_found(format!("question {} not found", id))),
        }
    }

    fn insert_question(&self, new_question: NewQuestion) -> TriviaResult<Question> {
        let mut state = self.write();
        state.last_id += 1;
        let question = new_question.into_question(state.last_id);
        state.questions.insert(question.id, question.clone());
        info!(
            "[Trivia::MemoryStore] Created question id={} category={}",
            question.id, question.category
        );
        Ok(question)
    }

    fn find_questions_by_category(&self, category: i64) -> TriviaResult<Vec<Question>> {
        Ok(self.filtered(|q| q.category == category))
    }

    fn search_questions(&self, term: &str) -> TriviaResult<Vec<Question>> {
        let corpus = self.list_questions()?;
        Ok(search::search(&corpus, term))
    }

    fn find_questions_excluding(
        &self,
        excluded: &HashSet<i64>,
        category: Option<i64>,
    ) -> TriviaResult<Vec<Question>> {
        Ok(self.filtered(|q| {
            !excluded.contains(&q.id) && category.map_or(true, |c| q.category == c)
        }))
    }
}

impl CategorySeed for MemoryQuestionStore {
    fn insert_category(&self, category: &Category) -> TriviaResult<()> {
        self.write()
            .categories
            .entry(category.id)
            .or_insert_with(|| category.clone());
        Ok(())
    }
}
