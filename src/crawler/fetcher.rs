//! 页面抓取器
//! 发起GET请求、提取页面资源引用、拉取脚本与样式内容

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::response::{Cookie, CrawlLink, FetchedPage, Response};
use crate::config::GlobalConfig;
use crate::error::TcResult;
use crate::extractor::HtmlExtractor;
use crate::utils::UrlResolver;

/// 页面抓取抽象
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取单个链接，任何错误都意味着该链接被丢弃
    async fn fetch(&self, link: &CrawlLink) -> TcResult<FetchedPage>;
}

/// 页面中的资源引用（同步提取，不跨 await 持有解析器）
struct PageRefs {
    anchors: Vec<String>,
    script_srcs: Vec<String>,
    stylesheet_hrefs: Vec<String>,
}

impl PageRefs {
    fn extract(html: &str) -> Self {
        let result = HtmlExtractor::new().extract(html);
        Self {
            anchors: result.get_anchor_hrefs(),
            script_srcs: result.get_script_srcs(),
            stylesheet_hrefs: result.get_stylesheet_hrefs(),
        }
    }
}

/// 基于 reqwest 的抓取器
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &GlobalConfig) -> TcResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.http_timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// 拉取资源文本内容
    async fn fetch_text(&self, url: Url) -> TcResult<String> {
        let text = self.client.get(url).send().await?.text().await?;
        Ok(text)
    }

    /// 解析并拉取资源，失败返回 None
    async fn fetch_resource(&self, base: &Url, raw: &str) -> Option<String> {
        let Some(url) = UrlResolver::resolve(base, raw) else {
            debug!("资源地址无法解析，已跳过：{}", raw);
            return None;
        };
        match self.fetch_text(url.clone()).await {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("资源拉取失败，已跳过：{}，错误：{}", url, e);
                None
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, link: &CrawlLink) -> TcResult<FetchedPage> {
        let http_response = self.client.get(link.url.clone()).send().await?;
        let headers = http_response.headers().clone();
        let cookies: Vec<Cookie> = http_response
            .cookies()
            .map(|c| Cookie::new(c.name(), c.value()))
            .collect();

        // 完整读取一次，解析器与 html 文本共用同一份内容
        let body = http_response.bytes().await?;
        let html = String::from_utf8_lossy(&body).into_owned();
        let refs = PageRefs::extract(&html);

        let mut response = Response::new(link.seed.clone(), link.url.clone());
        for src in &refs.script_srcs {
            if let Some(script) = self.fetch_resource(&link.url, src).await {
                response.script_links.push(src.clone());
                response.scripts.push(script);
            }
        }
        for href in &refs.stylesheet_hrefs {
            if let Some(style) = self.fetch_resource(&link.url, href).await {
                response.styles.push(style);
            }
        }

        let links = refs
            .anchors
            .iter()
            .filter_map(|href| UrlResolver::resolve(&link.url, href))
            .collect();

        response.html = html;
        response.headers = headers;
        response.cookies = cookies;

        Ok(FetchedPage { response, links })
    }
}
