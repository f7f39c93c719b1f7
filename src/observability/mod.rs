//! 可观测性模块
//!
//! 提供结构化日志初始化和会话级计数指标。

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::config::LoggingConfig;
use crate::services::responder::ResponseSource;

// ===== Logging =====

/// 初始化 tracing
///
/// 交互界面占用 stdout，日志写到 stderr；配置了 `log_dir` 时改为按天滚动的文件。
/// `RUST_LOG` 优先于配置中的级别。返回的 guard 需要保持到进程退出。
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hybrid-chatbot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (writer, Some(guard))
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, Some(guard))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false);

    let result = if config.structured {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // 重复初始化（例如测试中）直接忽略
    if result.is_err() {
        return None;
    }

    guard
}

// ===== Simple Metrics =====

/// 应答器计数指标
#[derive(Debug, Default)]
pub struct ResponderMetrics {
    pub knowledge_replies: AtomicU64,
    pub wikipedia_replies: AtomicU64,
    pub system_replies: AtomicU64,
    pub exit_requests: AtomicU64,
    pub lookup_failures: AtomicU64,
    pub turn_errors: AtomicU64,
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub knowledge_replies: u64,
    pub wikipedia_replies: u64,
    pub system_replies: u64,
    pub exit_requests: u64,
    pub lookup_failures: u64,
    pub turn_errors: u64,
}

impl MetricsSnapshot {
    pub fn total_replies(&self) -> u64 {
        self.knowledge_replies + self.wikipedia_replies + self.system_replies
    }
}

impl ResponderMetrics {
    /// 记录一次回复
    pub fn record_reply(&self, source: ResponseSource) {
        let counter = match source {
            ResponseSource::ChatbotKnowledge => &self.knowledge_replies,
            ResponseSource::Wikipedia => &self.wikipedia_replies,
            ResponseSource::System => &self.system_replies,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录退出命令
    pub fn record_exit(&self) {
        self.exit_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录外部查询失败
    pub fn record_lookup_failure(&self) {
        self.lookup_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录单轮处理错误
    pub fn record_turn_error(&self) {
        self.turn_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            knowledge_replies: self.knowledge_replies.load(Ordering::Relaxed),
            wikipedia_replies: self.wikipedia_replies.load(Ordering::Relaxed),
            system_replies: self.system_replies.load(Ordering::Relaxed),
            exit_requests: self.exit_requests.load(Ordering::Relaxed),
            lookup_failures: self.lookup_failures.load(Ordering::Relaxed),
            turn_errors: self.turn_errors.load(Ordering::Relaxed),
        }
    }

    /// 会话结束时输出汇总
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            total = snapshot.total_replies(),
            knowledge = snapshot.knowledge_replies,
            wikipedia = snapshot.wikipedia_replies,
            system = snapshot.system_replies,
            lookup_failures = snapshot.lookup_failures,
            turn_errors = snapshot.turn_errors,
            "Session metrics"
        );
    }
}
