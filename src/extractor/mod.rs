//! 提取模块：HTML资源引用提取
pub mod html_extractor;

pub use self::html_extractor::HtmlExtractor;
