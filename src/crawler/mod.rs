//! 爬虫模块：页面抓取与并发调度
pub mod response;
pub mod fetcher;
pub mod crawler;

pub use self::response::{Cookie, CrawlLink, FetchedPage, Response, Seed};
pub use self::fetcher::{HttpFetcher, PageFetcher};
pub use self::crawler::ConcurrentCrawler;
