//! 指纹库编译器核心
//! 仅负责将原始规则编译为可执行的正则模式

use std::collections::HashMap;
use std::time::Instant;

use regex::Regex;
use reqwest::header::HeaderName;
use tracing::debug;

use super::pattern::{CompiledCatalog, CompiledTechnology, HeaderRule, ValueMatcher};
use crate::rule::{Catalog, Technology};

/// 指纹库编译器
pub struct CatalogCompiler;

impl CatalogCompiler {
    /// 编译指纹库
    ///
    /// 编译失败的正则（如 `(?<=foo)bar` 这类环视语法）不会中断编译，
    /// 对应规则直接剔除，效果等同于匹配阶段跳过该规则。
    pub fn compile(catalog: &Catalog) -> CompiledCatalog {
        let start = Instant::now();
        let mut stats = CompileStats::default();

        let mut technologies: Vec<CompiledTechnology> = catalog
            .technologies
            .iter()
            .map(|(name, tech)| Self::compile_technology(catalog, name, tech, &mut stats))
            .collect();
        technologies.sort_by(|a, b| a.name.cmp(&b.name));

        debug!("✅ 指纹库编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "📊 编译统计：技术{}条、Header规则{}条、Cookie规则{}条、正则{}条、跳过{}条",
            technologies.len(),
            stats.header_count,
            stats.cookie_count,
            stats.regex_count,
            stats.skipped_count
        );

        CompiledCatalog { technologies }
    }

    /// 编译单个技术规则
    fn compile_technology(
        catalog: &Catalog,
        name: &str,
        tech: &Technology,
        stats: &mut CompileStats,
    ) -> CompiledTechnology {
        let header_rules = tech
            .headers
            .iter()
            .filter_map(|(header, pattern)| {
                let Ok(header_name) = HeaderName::from_bytes(header.as_bytes()) else {
                    debug!("无效Header名称，跳过规则：技术={}，Header={}", name, header);
                    stats.skipped_count += 1;
                    return None;
                };
                let matcher = Self::compile_value_matcher(name, pattern, stats)?;
                stats.header_count += 1;
                Some(HeaderRule { name: header_name, matcher })
            })
            .collect();

        let mut cookie_rules = HashMap::with_capacity(tech.cookies.len());
        for (cookie, pattern) in &tech.cookies {
            if let Some(matcher) = Self::compile_value_matcher(name, pattern, stats) {
                stats.cookie_count += 1;
                cookie_rules.insert(cookie.clone(), matcher);
            }
        }

        // js 仅取非空的值
        let js_values = tech.js.values().filter(|v| !v.is_empty());

        CompiledTechnology {
            name: name.to_string(),
            description: tech.description.clone(),
            website: tech.website.clone(),
            header_rules,
            cookie_rules,
            script_patterns: Self::compile_pattern_list(name, tech.scripts.iter(), stats),
            js_patterns: Self::compile_pattern_list(name, js_values, stats),
            html_patterns: Self::compile_pattern_list(name, tech.html.iter(), stats),
            css_patterns: Self::compile_pattern_list(name, tech.css.iter(), stats),
            categories: tech.cats.iter().map(|id| catalog.category_name(*id)).collect(),
            implies: tech.implies.to_vec(),
            excludes: tech.excludes.to_vec(),
        }
    }

    /// 编译键值对型规则的取值（空值仅要求名称存在）
    fn compile_value_matcher(
        tech_name: &str,
        raw_pattern: &str,
        stats: &mut CompileStats,
    ) -> Option<ValueMatcher> {
        let matcher = if raw_pattern.is_empty() {
            ValueMatcher::Exists
        } else {
            ValueMatcher::Regex(Self::compile_single_pattern(tech_name, raw_pattern, stats)?)
        };
        debug!("键值规则：技术={}，匹配={}", tech_name, matcher.describe());
        Some(matcher)
    }

    /// 编译列表型规则（scripts/js/html/css）
    fn compile_pattern_list<'a>(
        tech_name: &str,
        raw_patterns: impl Iterator<Item = &'a String>,
        stats: &mut CompileStats,
    ) -> Vec<Regex> {
        raw_patterns
            .filter_map(|raw| Self::compile_single_pattern(tech_name, raw, stats))
            .collect()
    }

    /// 编译单个正则，失败返回 None
    fn compile_single_pattern(
        tech_name: &str,
        source: &str,
        stats: &mut CompileStats,
    ) -> Option<Regex> {
        match Regex::new(source) {
            Ok(regex) => {
                stats.regex_count += 1;
                Some(regex)
            }
            Err(e) => {
                stats.skipped_count += 1;
                debug!("正则编译失败，跳过规则：技术={}，规则={}，错误={}", tech_name, source, e);
                None
            }
        }
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    header_count: usize,
    cookie_count: usize,
    regex_count: usize,
    skipped_count: usize,
}
