//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TechCrawlError;

/// 默认并发上限
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// 结果输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 带缩进的JSON
    #[default]
    Json,
    /// MessagePack二进制
    MsgPack,
}

impl FromStr for OutputFormat {
    type Err = TechCrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "msgpack" | "mp" => Ok(Self::MsgPack),
            other => Err(TechCrawlError::InvalidInput(format!("不支持的输出格式：{}", other))),
        }
    }
}

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 指纹库位置（本地路径或 http(s) URL）
    pub catalog_location: String,
    // 结果文件路径
    pub result_path: PathBuf,
    pub output_format: OutputFormat,
    // 同时抓取的页面数上限
    pub max_concurrency: usize,
    // 是否跟随外部站点链接
    pub follow_external_links: bool,
    // 单次请求超时（单位：秒），None 表示使用HTTP客户端默认策略
    pub http_timeout: Option<u64>,
    // 队列为空且无在途任务时自动结束
    pub exit_when_idle: bool,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            catalog_location: "technologies.json".to_string(),
            result_path: PathBuf::from("fingerprints.json"),
            output_format: OutputFormat::Json,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            follow_external_links: true,
            http_timeout: None,
            exit_when_idle: false,
            verbose: false,
        }
    }
}

impl GlobalConfig {
    /// 实际使用的并发数（0 按 1 处理）
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog_location(mut self, location: impl Into<String>) -> Self {
        self.config.catalog_location = location.into();
        self
    }

    pub fn result_path(mut self, path: PathBuf) -> Self {
        self.config.result_path = path;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.config.max_concurrency = max;
        self
    }

    pub fn follow_external_links(mut self, follow: bool) -> Self {
        self.config.follow_external_links = follow;
        self
    }

    pub fn http_timeout(mut self, timeout: Option<u64>) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn exit_when_idle(mut self, exit: bool) -> Self {
        self.config.exit_when_idle = exit;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
