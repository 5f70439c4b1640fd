//! URL处理工具
//! 相对链接补全、站点归属判断

use url::{ParseError, Url};

/// URL解析工具
pub struct UrlResolver;

impl UrlResolver {
    /// 解析页面中的链接：无主机部分的链接基于 base 补全
    pub fn resolve(base: &Url, raw: &str) -> Option<Url> {
        let raw = raw.trim();
        match Url::parse(raw) {
            Ok(url) if url.host().is_some() => Some(url),
            Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => base.join(raw).ok(),
            Err(_) => None,
        }
    }

    /// 判断两个URL是否属于同一站点（主机 + 显式端口）
    pub fn same_host(a: &Url, b: &Url) -> bool {
        a.host_str() == b.host_str() && a.port() == b.port()
    }
}
