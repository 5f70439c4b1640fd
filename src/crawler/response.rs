//! 抓取结果模型

use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use url::Url;

/// 种子URL：划定站点范围，同时作为结果的归集键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seed {
    // 用户输入的原始字符串（去除首尾空白）
    pub key: String,
    pub url: Url,
}

impl Seed {
    /// 解析种子，失败返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim();
        if key.is_empty() {
            return None;
        }
        Url::parse(key).ok().map(|url| Self {
            key: key.to_string(),
            url,
        })
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// 待抓取链接
#[derive(Debug, Clone)]
pub struct CrawlLink {
    pub url: Url,
    pub seed: Arc<Seed>,
}

impl CrawlLink {
    pub fn seed(seed: Arc<Seed>) -> Self {
        Self {
            url: seed.url.clone(),
            seed,
        }
    }
}

/// 响应中的Cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 单个页面的检测信号
#[derive(Debug, Clone)]
pub struct Response {
    pub seed: Arc<Seed>,
    pub url: Url,
    pub html: String,
    pub headers: HeaderMap,
    pub cookies: Vec<Cookie>,
    // script 标签的原始 src
    pub script_links: Vec<String>,
    // 对应脚本的内容
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
}

impl Response {
    /// 创建空响应
    pub fn new(seed: Arc<Seed>, url: Url) -> Self {
        Self {
            seed,
            url,
            html: String::new(),
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            script_links: Vec::new(),
            scripts: Vec::new(),
            styles: Vec::new(),
        }
    }

    /// 种子URL
    pub fn start_url(&self) -> &Url {
        &self.seed.url
    }
}

/// 抓取到的页面：检测信号 + 页面中的出站链接
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub response: Response,
    pub links: Vec<Url>,
}
