//! Wikipedia 客户端
//!
//! 搜索走 MediaWiki action API，摘要走 REST `page/summary` 接口。

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{EncyclopediaClient, EncyclopediaError};
use crate::config::config::EncyclopediaConfig;
use crate::error::Result;

pub struct WikipediaClient {
    client: reqwest::Client,
    base_url: String,
    search_limit: usize,
    summary_sentences: usize,
    min_request_interval: Option<Duration>,
    last_request: Mutex<Option<Instant>>,
}

#[derive(Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(rename = "type", default)]
    page_type: String,
    title: String,
    #[serde(default)]
    extract: String,
}

#[derive(Deserialize)]
struct ParseResponse {
    parse: Option<ParsedPage>,
}

#[derive(Deserialize)]
struct ParsedPage {
    #[serde(default)]
    links: Vec<ParsedLink>,
}

#[derive(Deserialize)]
struct ParsedLink {
    ns: i64,
    title: String,
}

impl WikipediaClient {
    pub fn new(config: &EncyclopediaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        let min_request_interval = config
            .rate_limit_enabled
            .then(|| Duration::from_millis(config.min_request_interval_ms));

        Ok(Self {
            client,
            base_url: config.resolved_base_url(),
            search_limit: config.search_limit.max(1),
            summary_sentences: config.summary_sentences,
            min_request_interval,
            last_request: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 保证相邻请求之间至少间隔 `min_request_interval`
    async fn throttle(&self) {
        let Some(interval) = self.min_request_interval else {
            return;
        };

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> std::result::Result<(StatusCode, Option<T>), EncyclopediaError> {
        self.throttle().await;

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "Wikipedia request unsuccessful");
            return Ok((status, None));
        }

        let body = response.json::<T>().await?;
        Ok((status, Some(body)))
    }

    /// 消歧义页面上的主命名空间链接，保持页面中的出现顺序
    ///
    /// `prop=links` 查询按标题排序，这里改用 `action=parse`，它按解析顺序列出链接。
    async fn disambiguation_options(&self, title: &str) -> Vec<String> {
        let url = format!("{}/w/api.php", self.base_url);
        let query = [
            ("action", "parse"),
            ("page", title),
            ("prop", "links"),
            ("redirects", "1"),
            ("format", "json"),
            ("formatversion", "2"),
        ];

        match self.get_json::<ParseResponse>(url, &query).await {
            Ok((_, Some(body))) => body
                .parse
                .map(|page| {
                    page.links
                        .into_iter()
                        .filter(|link| link.ns == 0)
                        .map(|link| link.title)
                        .collect()
                })
                .unwrap_or_default(),
            Ok((status, None)) => {
                warn!(title, %status, "Failed to list disambiguation options");
                Vec::new()
            }
            Err(e) => {
                warn!(title, error = %e, "Failed to list disambiguation options");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl EncyclopediaClient for WikipediaClient {
    async fn search(&self, query: &str) -> std::result::Result<Vec<String>, EncyclopediaError> {
        let url = format!("{}/w/api.php", self.base_url);
        let limit = self.search_limit.to_string();
        let params = [
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", limit.as_str()),
            ("srprop", ""),
            ("format", "json"),
            ("formatversion", "2"),
        ];

        match self.get_json::<SearchResponse>(url, &params).await? {
            (_, Some(body)) => Ok(body
                .query
                .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
                .unwrap_or_default()),
            (status, None) => Err(EncyclopediaError::Transient(format!(
                "search failed with status {status}"
            ))),
        }
    }

    async fn summarize(&self, title: &str) -> std::result::Result<String, EncyclopediaError> {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.base_url,
            urlencoding::encode(&title.replace(' ', "_"))
        );

        let summary = match self
            .get_json::<SummaryResponse>(url, &[("redirect", "true")])
            .await?
        {
            (_, Some(body)) => body,
            (StatusCode::NOT_FOUND, None) => {
                return Err(EncyclopediaError::NotFound(title.to_string()));
            }
            (status, None) => {
                return Err(EncyclopediaError::Transient(format!(
                    "summary failed with status {status}"
                )));
            }
        };

        if summary.page_type == "disambiguation" {
            let options = self.disambiguation_options(&summary.title).await;
            return Err(EncyclopediaError::Ambiguous {
                title: summary.title,
                options,
            });
        }

        let extract = summary.extract.trim();
        if extract.is_empty() {
            return Err(EncyclopediaError::NotFound(title.to_string()));
        }

        Ok(first_sentences(extract, self.summary_sentences))
    }
}

/// 截取前 `count` 个句子；`count` 为 0 时返回全文
pub fn first_sentences(text: &str, count: usize) -> String {
    if count == 0 {
        return text.trim().to_string();
    }

    let mut seen = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                seen += 1;
                if seen == count {
                    return text[..idx + ch.len_utf8()].trim().to_string();
                }
            }
        }
    }

    text.trim().to_string()
}
