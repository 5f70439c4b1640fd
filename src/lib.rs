//! rstechcrawl - 并发爬取网站并识别其技术栈

// 导出全局错误类型
pub use self::error::{TechCrawlError, TcResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder, OutputFormat};

// 导出规则模块核心接口
pub use self::rule::{Catalog, Category, PatternList, Technology, CatalogLoader};

// 导出编译模块核心接口
pub use self::compiler::{CompiledCatalog, CompiledTechnology, CatalogCompiler};

// 导出提取模块核心接口
pub use self::extractor::HtmlExtractor;

// 导出工具模块核心接口
pub use self::utils::UrlResolver;

// 导出爬虫模块核心接口
pub use self::crawler::{
    ConcurrentCrawler, CrawlLink, Cookie, FetchedPage, HttpFetcher, PageFetcher, Response, Seed,
};

// 导出检测模块核心接口
pub use self::detector::{
    CrawlReport, DetectedTechnology, MatchFamily, SeedReport, SeedResult, WebAnalyzer,
};

// 导出结果持久化接口
pub use self::sink::ResultSink;

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod compiler;
pub mod extractor;
pub mod utils;
pub mod crawler;
pub mod detector;
pub mod sink;
