//! 匹配模块
//!
//! 文本规范化、序列相似度与意图匹配。

pub mod matcher;
pub mod normalize;
pub mod similarity;

pub use matcher::{IntentMatch, best_candidate, match_intent};
pub use normalize::{command_key, normalize};
pub use similarity::{MatchingBlock, SequenceMatcher, similarity};
