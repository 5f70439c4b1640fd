//! 检测模块：指纹匹配与结果累积
pub mod matcher;
pub mod result;
pub mod analyzer;

// 导出核心接口
pub use self::matcher::MatchFamily;
pub use self::result::{CrawlReport, DetectedTechnology, SeedReport, SeedResult};
pub use self::analyzer::WebAnalyzer;
