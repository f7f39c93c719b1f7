//! 意图文件加载
//!
//! 文件格式：`{"intents": [{"tag": ..., "patterns": [...], "responses": [...]}]}`。
//! 整体结构错误是致命的；单条记录格式错误时跳过该条。

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::config::IntentsConfig;
use crate::error::{AppError, Result};
use crate::models::intent::{Intent, IntentStore};

/// 加载统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
    pub unusable: usize,
}

/// 从文件加载意图库
pub fn load_intents(path: &Path) -> Result<IntentStore> {
    if !path.exists() {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        return Err(AppError::IntentFileNotFound(absolute.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let (store, report) = parse_intents(&content)?;

    info!(
        path = %path.display(),
        loaded = report.loaded,
        skipped = report.skipped,
        unusable = report.unusable,
        "Intents loaded"
    );
    Ok(store)
}

/// 解析意图 JSON 文本
pub fn parse_intents(content: &str) -> Result<(IntentStore, LoadReport)> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| AppError::IntentStore(format!("invalid JSON: {e}")))?;

    let entries = document
        .get("intents")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::IntentStore("JSON file must contain 'intents' array".into()))?;

    let mut report = LoadReport::default();
    let mut intents = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<Intent>(entry.clone()) {
            Ok(intent) => {
                if !intent.is_usable() {
                    warn!(
                        index,
                        tag = %intent.tag,
                        patterns = intent.patterns.len(),
                        responses = intent.responses.len(),
                        "Intent has no patterns or no responses and will never answer"
                    );
                    report.unusable += 1;
                }
                intents.push(intent);
                report.loaded += 1;
            }
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed intent entry");
                report.skipped += 1;
            }
        }
    }

    Ok((IntentStore::new(intents), report))
}

/// 确定要加载的意图文件
///
/// 优先级：显式路径（命令行或配置）> 候选路径（工作目录，再到可执行文件目录）。
/// 显式路径不存在时照样返回，由加载阶段报告缺失。
pub fn resolve_intents_path(explicit: Option<PathBuf>, config: &IntentsConfig) -> Option<PathBuf> {
    if let Some(path) = explicit.or_else(|| config.path.clone()) {
        return Some(path);
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    candidate_paths(&config.search_paths, exe_dir.as_deref())
        .into_iter()
        .find(|candidate| candidate.exists())
}

fn candidate_paths(search_paths: &[PathBuf], exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = search_paths.to_vec();
    if let Some(dir) = exe_dir {
        candidates.extend(
            search_paths
                .iter()
                .filter(|path| path.is_relative())
                .map(|path| dir.join(path)),
        );
    }
    candidates
}
