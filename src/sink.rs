//! 结果持久化
//! 将累积结果序列化为 JSON 或 MessagePack 并写入结果文件

use std::path::{Path, PathBuf};

use rmp_serde::Serializer;
use serde::Serialize;
use tracing::debug;

use crate::config::{GlobalConfig, OutputFormat};
use crate::detector::CrawlReport;
use crate::error::{TcResult, TechCrawlError};

/// 结果写入器
#[derive(Debug, Clone)]
pub struct ResultSink {
    path: PathBuf,
    format: OutputFormat,
}

impl ResultSink {
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self { path: path.into(), format }
    }

    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(config.result_path.clone(), config.output_format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 按输出格式编码
    pub fn encode(&self, report: &CrawlReport) -> TcResult<Vec<u8>> {
        match self.format {
            OutputFormat::Json => Self::to_pretty_json(report).map(String::into_bytes),
            OutputFormat::MsgPack => {
                let mut data = Vec::new();
                // 结构体按字段名编码，保证读取端可按 JSON 相同结构解析
                report
                    .serialize(&mut Serializer::new(&mut data).with_struct_map())
                    .map_err(|e| TechCrawlError::ResultEncodeError(format!("MessagePack序列化失败：{}", e)))?;
                Ok(data)
            }
        }
    }

    /// 写入结果文件（覆盖），返回文件路径
    pub fn save(&self, report: &CrawlReport) -> TcResult<PathBuf> {
        let data = self.encode(report)?;
        debug!("结果序列化成功，种子数：{}，数据大小：{} 字节", report.len(), data.len());

        std::fs::write(&self.path, data).map_err(|source| TechCrawlError::ResultWriteError {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.path.clone())
    }

    /// 缩进格式的 JSON 文本，同时用于终端回显
    pub fn to_pretty_json(report: &CrawlReport) -> TcResult<String> {
        serde_json::to_string_pretty(report)
            .map_err(|e| TechCrawlError::ResultEncodeError(format!("JSON序列化失败：{}", e)))
    }
}
