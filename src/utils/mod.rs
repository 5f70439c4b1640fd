//! 工具模块
pub mod url_resolver;

pub use self::url_resolver::UrlResolver;
