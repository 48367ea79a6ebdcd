//! 问答模式选题
//!
//! 无状态：调用方每次提交完整的已答 id 列表。
//! 候选集 = 目标分类（或全部）中 id 不在历史里的题目；候选为空表示题目已答完，
//! 不是错误。候选中按均匀分布随机抽取一道。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::debug;

use crate::error::TriviaResult;
use crate::models::Question;
use crate::storage::QuestionStore;

/// 分类过滤条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(i64),
}

impl CategoryFilter {
    /// 表示「全部分类」的哨兵值
    pub const ALL_CATEGORIES_ID: i64 = 0;

    pub fn from_id(id: i64) -> Self {
        if id == Self::ALL_CATEGORIES_ID {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(id)
        }
    }

    pub fn category(&self) -> Option<i64> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(id) => Some(*id),
        }
    }
}

/// 随机源；可替换以便测试时固定抽取结果
pub trait RandomSource: Send + Sync {
    /// 返回 `[0, len)` 内的下标，`len > 0`
    fn pick_index(&self, len: usize) -> usize;
}

/// 线程本地 RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// 固定种子 RNG，抽题序列可复现
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len)
    }
}

/// 从候选中抽一道
pub fn choose<'a>(candidates: &'a [Question], random: &dyn RandomSource) -> Option<&'a Question> {
    if candidates.is_empty() {
        return None;
    }
    let idx = random.pick_index(candidates.len()).min(candidates.len() - 1);
    candidates.get(idx)
}

/// 选出下一道未答过的题；`Ok(None)` 表示候选为空
pub fn next_question(
    store: &dyn QuestionStore,
    previous: &HashSet<i64>,
    filter: CategoryFilter,
    random: &dyn RandomSource,
) -> TriviaResult<Option<Question>> {
    let candidates = store.find_questions_excluding(previous, filter.category())?;
    debug!(
        "[Trivia::Quiz] filter={:?} previous={} candidates={}",
        filter,
        previous.len(),
        candidates.len()
    );
    Ok(choose(&candidates, random).cloned())
}
