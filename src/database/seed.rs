//! 题库播种工具
//! 分类由外部预置；空库启动时可选写入默认分类和示例题目，便于本地联调
use tracing::info;

use crate::error::TriviaResult;
use crate::models::{Category, NewQuestion};
use crate::storage::{CategorySeed, QuestionStore};

/// 默认分类（id 从 1 开始）
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

/// (题干, 答案, 分类, 难度)
const SAMPLE_QUESTIONS: [(&str, &str, i64, i64); 8] = [
    ("What is the heaviest organ in the human body?", "The Liver", 1, 4),
    ("Who discovered penicillin?", "Alexander Fleming", 1, 3),
    ("Which Dutch graphic artist–initials M C was a creator of optical illusions?", "Escher", 2, 1),
    ("La Giaconda is better known as what?", "Mona Lisa", 2, 3),
    ("What is the largest lake in Africa?", "Lake Victoria", 3, 2),
    ("Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?", "Maya Angelou", 4, 2),
    ("What movie earned Tom Hanks his third straight Oscar nomination, in 1996?", "Apollo 13", 5, 4),
    ("Which is the only team to play in every soccer World Cup tournament?", "Brazil", 6, 3),
];

/// 种子数据配置
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// 分类表为空时写入默认分类
    pub create_default_categories: bool,
    /// 题目表为空时写入示例题目
    pub create_sample_questions: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            create_default_categories: true,
            create_sample_questions: false,
        }
    }
}

/// 播种结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub categories_created: usize,
    pub questions_created: usize,
}

/// 播种题库：只在对应表为空时写入，重复调用无副作用
pub fn seed_store<S>(store: &S, config: &SeedConfig) -> TriviaResult<SeedResult>
where
    S: QuestionStore + CategorySeed + ?Sized,
{
    let mut result = SeedResult::default();

    if config.create_default_categories && store.list_categories()?.is_empty() {
        for (idx, name) in DEFAULT_CATEGORIES.iter().enumerate() {
            store.insert_category(&Category::new(idx as i64 + 1, *name))?;
            result.categories_created += 1;
        }
    }

    if config.create_sample_questions && store.list_questions()?.is_empty() {
        for (question, answer, category, difficulty) in SAMPLE_QUESTIONS {
            store.insert_question(NewQuestion {
                question: question.to_string(),
                answer: answer.to_string(),
                category,
                difficulty,
            })?;
            result.questions_created += 1;
        }
    }

    if result != SeedResult::default() {
        info!(
            "[Trivia::Seed] Seeded {} categories, {} questions",
            result.categories_created, result.questions_created
        );
    }
    Ok(result)
}
