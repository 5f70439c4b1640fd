//! 指纹库加载
//! 负责从本地文件或远程URL读取 technologies.json

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::model::Catalog;
use crate::config::GlobalConfig;
use crate::error::{TcResult, TechCrawlError};

/// 指纹库加载器
pub struct CatalogLoader;

impl CatalogLoader {
    /// 按配置加载指纹库（http(s) 前缀走远程，否则读本地文件）
    pub async fn load(config: &GlobalConfig) -> TcResult<Catalog> {
        let location = config.catalog_location.trim();
        let catalog = if Self::is_remote(location) {
            Self::fetch_remote(location, config.http_timeout).await?
        } else {
            Self::load_from_file(location).await?
        };

        debug!(
            "指纹库加载成功：技术{}条，分类{}条",
            catalog.technologies.len(),
            catalog.categories.len()
        );
        Ok(catalog)
    }

    /// 读取本地指纹库文件
    pub async fn load_from_file(path: impl AsRef<Path>) -> TcResult<Catalog> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TechCrawlError::CatalogReadError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_slice(&bytes)
    }

    /// 从内存数据解析
    pub fn from_slice(bytes: &[u8]) -> TcResult<Catalog> {
        serde_json::from_slice(bytes).map_err(|source| TechCrawlError::CatalogDecodeError { source })
    }

    pub fn from_json_str(json: &str) -> TcResult<Catalog> {
        Self::from_slice(json.as_bytes())
    }

    /// 拉取远程指纹库
    async fn fetch_remote(url: &str, timeout: Option<u64>) -> TcResult<Catalog> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let wrap = |source: reqwest::Error| TechCrawlError::CatalogFetchError {
            url: url.to_string(),
            source,
        };
        let response = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(wrap)?;
        let bytes = response.bytes().await.map_err(wrap)?;

        debug!("远程指纹库拉取完成：{}，{} 字节", url, bytes.len());
        Self::from_slice(&bytes)
    }

    fn is_remote(location: &str) -> bool {
        let lower = location.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"categories": {{"1": {{"name": "CMS"}}}}, "technologies": {{"Alpha": {{"cats": [1], "html": "alpha"}}}}}}"#
        )
        .unwrap();

        let catalog = CatalogLoader::load_from_file(file.path()).await.unwrap();
        assert_eq!(catalog.technologies.len(), 1);
        assert_eq!(catalog.category_name(1), "CMS");
    }

    #[tokio::test]
    async fn test_missing_file_keeps_cause() {
        let err = CatalogLoader::load_from_file("/nonexistent/technologies.json")
            .await
            .unwrap_err();
        assert!(matches!(err, TechCrawlError::CatalogReadError { .. }));
        let source = err.source().expect("io cause");
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_decode_error_keeps_cause() {
        let err = CatalogLoader::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TechCrawlError::CatalogDecodeError { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_is_remote() {
        assert!(CatalogLoader::is_remote("https://example.com/technologies.json"));
        assert!(CatalogLoader::is_remote("HTTP://example.com/t.json"));
        assert!(!CatalogLoader::is_remote("./technologies.json"));
    }
}
