//! 核心数据模型模块
//!
//! 定义意图（Intent）与意图库（IntentStore）。

pub mod intent;

pub use intent::*;
