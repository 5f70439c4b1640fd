//! 页面分析器
//! 对每个页面逐一评估指纹库，并按种子URL累积结果

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::matcher::MatchFamily;
use super::result::{CrawlReport, SeedResult};
use crate::compiler::{CatalogCompiler, CompiledCatalog};
use crate::config::GlobalConfig;
use crate::crawler::Response;
use crate::error::TcResult;
use crate::rule::{Catalog, CatalogLoader};

/// 技术栈分析器，可在多个抓取任务间共享
#[derive(Debug)]
pub struct WebAnalyzer {
    compiled_lib: CompiledCatalog,
    // 种子字符串 -> 累积结果
    results: Mutex<HashMap<String, SeedResult>>,
}

impl WebAnalyzer {
    /// 按配置加载并编译指纹库，失败即返回错误
    pub async fn new(config: &GlobalConfig) -> TcResult<Self> {
        let catalog = CatalogLoader::load(config).await?;
        Ok(Self::from_catalog(&catalog))
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            compiled_lib: CatalogCompiler::compile(catalog),
            results: Mutex::new(HashMap::new()),
        }
    }

    /// 分析单个页面，结果并入其种子的累积结果
    pub fn analyze(&self, response: &Response) {
        let page_result = self.analyze_single(response);

        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results
            .entry(response.seed.key.clone())
            .or_default()
            .merge(page_result);
    }

    /// 对单个页面执行匹配，不修改累积结果
    pub fn analyze_single(&self, response: &Response) -> SeedResult {
        let mut page_result = SeedResult::default();
        for tech in &self.compiled_lib.technologies {
            if let Some(family) = MatchFamily::first_match(tech, response) {
                debug!("技术命中：技术={}，维度={}，页面={}", tech.name, family, response.url);
                page_result.record(tech);
            }
        }
        page_result
    }

    /// 当前累积结果的快照
    pub fn report(&self) -> CrawlReport {
        let results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results
            .iter()
            .map(|(seed, result)| (seed.clone(), result.to_report()))
            .collect()
    }
}
