//! 检测结果模型
//! 内存中按集合累积，输出时转换为有序序列

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::compiler::CompiledTechnology;

/// 命中的技术
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectedTechnology {
    pub name: String,
    pub description: String,
    pub website: String,
}

/// 单个种子的累积结果，所有字段均为集合，重复加入无副作用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub detected_technologies: HashSet<DetectedTechnology>,
    pub implies: HashSet<String>,
    pub excludes: HashSet<String>,
    pub categories: HashSet<String>,
}

impl SeedResult {
    /// 记录一个命中的技术及其分类、关联规则
    pub fn record(&mut self, tech: &CompiledTechnology) {
        self.detected_technologies.insert(DetectedTechnology {
            name: tech.name.clone(),
            description: tech.description.clone(),
            website: tech.website.clone(),
        });
        self.categories.extend(tech.categories.iter().cloned());
        self.implies.extend(tech.implies.iter().cloned());
        self.excludes.extend(tech.excludes.iter().cloned());
    }

    /// 合并另一份结果（集合并集）
    pub fn merge(&mut self, other: SeedResult) {
        self.detected_technologies.extend(other.detected_technologies);
        self.implies.extend(other.implies);
        self.excludes.extend(other.excludes);
        self.categories.extend(other.categories);
    }

    /// 转换为可序列化的结构
    pub fn to_report(&self) -> SeedReport {
        SeedReport {
            detected_technologies: sorted(self.detected_technologies.iter().cloned()),
            implies: sorted(self.implies.iter().cloned()),
            excludes: sorted(self.excludes.iter().cloned()),
            categories: sorted(self.categories.iter().cloned()),
        }
    }
}

/// 单个种子的输出结构
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeedReport {
    pub detected_technologies: Vec<DetectedTechnology>,
    pub implies: Vec<String>,
    pub excludes: Vec<String>,
    pub categories: Vec<String>,
}

/// 全部种子的输出结构：种子字符串 -> 结果
pub type CrawlReport = BTreeMap<String, SeedReport>;

fn sorted<T: Ord>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut v: Vec<T> = items.collect();
    v.sort();
    v
}
