//! 意图数据模型
//!
//! 意图由示例短语和候选回复组成，加载后不可变。

use serde::{Deserialize, Serialize};

/// 单个意图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// 意图标识
    pub tag: String,

    /// 示例短语，用作相似度比较目标
    pub patterns: Vec<String>,

    /// 候选回复
    pub responses: Vec<String>,
}

impl Intent {
    /// 创建新意图
    pub fn new<P, R>(tag: &str, patterns: P, responses: R) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            tag: tag.to_string(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }

    /// 至少有一个示例短语和一个回复
    pub fn is_usable(&self) -> bool {
        !self.patterns.is_empty() && !self.responses.is_empty()
    }
}

/// 意图库：启动时加载一次，之后只读
#[derive(Debug, Clone, Default)]
pub struct IntentStore {
    intents: Vec<Intent>,
}

impl IntentStore {
    pub fn new(intents: Vec<Intent>) -> Self {
        Self { intents }
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intent> {
        self.intents.iter()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// 按标识查找（标识不强制唯一，返回第一个）
    pub fn find_by_tag(&self, tag: &str) -> Option<&Intent> {
        self.intents.iter().find(|intent| intent.tag == tag)
    }

    /// 所有示例短语的总数
    pub fn pattern_count(&self) -> usize {
        self.intents.iter().map(|intent| intent.patterns.len()).sum()
    }
}

impl From<Vec<Intent>> for IntentStore {
    fn from(intents: Vec<Intent>) -> Self {
        Self::new(intents)
    }
}

impl<'a> IntoIterator for &'a IntentStore {
    type Item = &'a Intent;
    type IntoIter = std::slice::Iter<'a, Intent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
