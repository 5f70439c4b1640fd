//! 编译后模式模型
//! 正则编译后的结构

use std::collections::HashMap;

use regex::Regex;
use reqwest::header::HeaderName;

/// 键值型规则（headers/cookies）的取值匹配器
#[derive(Debug, Clone)]
pub enum ValueMatcher {
    Exists,       // 规则值为空：仅要求名称存在
    Regex(Regex), // 正则匹配
}

impl ValueMatcher {
    /// 简单匹配判断
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            ValueMatcher::Exists => true,
            ValueMatcher::Regex(regex) => regex.is_match(input),
        }
    }

    /// 规则描述
    pub fn describe(&self) -> &str {
        match self {
            ValueMatcher::Exists => "exists",
            ValueMatcher::Regex(r) => r.as_str(),
        }
    }
}

/// 单条Header规则
#[derive(Debug, Clone)]
pub struct HeaderRule {
    pub name: HeaderName,
    pub matcher: ValueMatcher,
}

/// 技术编译后的规则
///
/// 无法编译的正则在编译阶段就被剔除，匹配阶段只会看到可用的规则。
#[derive(Debug, Clone, Default)]
pub struct CompiledTechnology {
    pub name: String,
    pub description: String,
    pub website: String,

    pub header_rules: Vec<HeaderRule>,
    // cookie名称 -> 匹配器
    pub cookie_rules: HashMap<String, ValueMatcher>,
    pub script_patterns: Vec<Regex>,
    pub js_patterns: Vec<Regex>,
    pub html_patterns: Vec<Regex>,
    pub css_patterns: Vec<Regex>,

    // 已解析的分类名称（缺失的分类ID解析为空字符串）
    pub categories: Vec<String>,
    pub implies: Vec<String>,
    pub excludes: Vec<String>,
}

/// 编译后的指纹库
#[derive(Debug, Clone, Default)]
pub struct CompiledCatalog {
    // 按技术名称排序，保证遍历顺序稳定
    pub technologies: Vec<CompiledTechnology>,
}

impl CompiledCatalog {
    pub fn get(&self, name: &str) -> Option<&CompiledTechnology> {
        self.technologies.iter().find(|t| t.name == name)
    }
}
