//! 全局错误类型定义

use std::io::Error as IoError;
use std::path::PathBuf;
use thiserror::Error;
use serde_json::Error as SerdeJsonError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum TechCrawlError {
    // 指纹库相关错误（构造阶段致命）
    #[error("指纹库读取失败：{}", path.display())]
    CatalogReadError {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("指纹库拉取失败：{url}")]
    CatalogFetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("指纹库JSON解析失败")]
    CatalogDecodeError {
        #[source]
        source: SerdeJsonError,
    },

    // 结果持久化错误（退出阶段致命）
    #[error("结果序列化失败：{0}")]
    ResultEncodeError(String),
    #[error("结果写入失败：{}", path.display())]
    ResultWriteError {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),

    // 基础错误
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

// 全局Result类型
pub type TcResult<T> = Result<T, TechCrawlError>;
