//! 百科查询模块
//!
//! 外部百科服务的调用约定：先搜索候选标题，再取最佳候选的摘要。

pub mod wikipedia;

pub use wikipedia::WikipediaClient;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::config::EncyclopediaConfig;

/// 百科查询失败类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncyclopediaError {
    /// 条目不存在
    #[error("page not found: {0}")]
    NotFound(String),

    /// 多个可能的条目
    #[error("\"{title}\" may refer to: {}", .options.join(", "))]
    Ambiguous { title: String, options: Vec<String> },

    /// 网络或服务故障
    #[error("transient failure: {0}")]
    Transient(String),
}

impl From<reqwest::Error> for EncyclopediaError {
    fn from(e: reqwest::Error) -> Self {
        EncyclopediaError::Transient(e.to_string())
    }
}

/// 百科客户端
#[async_trait]
pub trait EncyclopediaClient: Send + Sync {
    /// 按相关度排序的候选标题
    async fn search(&self, query: &str) -> Result<Vec<String>, EncyclopediaError>;

    /// 条目的简短摘要
    async fn summarize(&self, title: &str) -> Result<String, EncyclopediaError>;
}

/// 外部查询的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalAnswer {
    /// 最佳候选的摘要
    Summary(String),

    /// 需要用户澄清的候选标题
    Clarify(Vec<String>),
}

/// 搜索后取第一个候选的摘要
///
/// 歧义会作为 `Clarify` 返回；`NotFound` 与 `Transient` 原样向上传递，
/// 由调用方决定如何兜底。没有候选时返回 `Ok(None)`。
pub async fn lookup(
    client: &dyn EncyclopediaClient,
    query: &str,
) -> Result<Option<ExternalAnswer>, EncyclopediaError> {
    let titles = match client.search(query).await {
        Ok(titles) => titles,
        Err(EncyclopediaError::Ambiguous { options, .. }) => {
            return Ok(Some(ExternalAnswer::Clarify(options)));
        }
        Err(e) => return Err(e),
    };

    let Some(best) = titles.first() else {
        return Ok(None);
    };

    match client.summarize(best).await {
        Ok(summary) => Ok(Some(ExternalAnswer::Summary(summary))),
        Err(EncyclopediaError::Ambiguous { options, .. }) => {
            Ok(Some(ExternalAnswer::Clarify(options)))
        }
        Err(e) => Err(e),
    }
}

/// 离线客户端：不访问网络，搜索永远没有结果
#[derive(Debug, Clone, Default)]
pub struct OfflineEncyclopedia;

#[async_trait]
impl EncyclopediaClient for OfflineEncyclopedia {
    async fn search(&self, _query: &str) -> Result<Vec<String>, EncyclopediaError> {
        Ok(Vec::new())
    }

    async fn summarize(&self, title: &str) -> Result<String, EncyclopediaError> {
        Err(EncyclopediaError::NotFound(title.to_string()))
    }
}

pub fn create_encyclopedia_client(
    config: &EncyclopediaConfig,
) -> crate::error::Result<Box<dyn EncyclopediaClient>> {
    if !config.enabled {
        info!("Encyclopedia lookups disabled, running offline");
        return Ok(Box::new(OfflineEncyclopedia));
    }

    let client = WikipediaClient::new(config)?;
    info!(base_url = %client.base_url(), "Wikipedia client initialized");
    Ok(Box::new(client))
}
