//! Hybrid Chatbot - 意图匹配聊天机器人
//!
//! 先用字符串相似度匹配本地意图库，匹配失败时查询外部百科，
//! 最后给出固定的兜底回复。

pub mod config;
pub mod encyclopedia;
pub mod error;
pub mod matching;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
