//! 存储层模块
//!
//! 从 JSON 文件加载只读的意图库。

pub mod intent_loader;

pub use intent_loader::{LoadReport, load_intents, parse_intents, resolve_intents_path};
