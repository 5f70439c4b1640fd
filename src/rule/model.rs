//! 指纹库数据模型定义
//! 仅存储规则数据，无任何业务逻辑，支持序列化/反序列化

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// 字符串或字符串数组
///
/// 指纹库中 `html`/`scripts`/`excludes`/`implies`/`css` 既可能是单个字符串，
/// 也可能是字符串数组，两种写法统一解析为序列。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PatternList(pub Vec<String>);

impl PatternList {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl Deref for PatternList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for PatternList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl<'a> IntoIterator for &'a PatternList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for PatternList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PatternListVisitor;

        impl<'de> Visitor<'de> for PatternListVisitor {
            type Value = PatternList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or an array of strings")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(PatternList(vec![v.to_string()]))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(PatternList(vec![v]))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(PatternList::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(PatternList::default())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element::<String>()? {
                    items.push(item);
                }
                Ok(PatternList(items))
            }
        }

        deserializer.deserialize_any(PatternListVisitor)
    }
}

/// 分类定义
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
}

/// 技术指纹定义（从 technologies.json 解析）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Technology {
    #[serde(default)]
    pub cats: Vec<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,

    // 检测规则
    #[serde(default)]
    pub cookies: HashMap<String, String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    // 仅使用值，键（window.xxx 之类的符号路径）不参与匹配
    #[serde(default)]
    pub js: HashMap<String, String>,
    #[serde(default)]
    pub html: PatternList,
    #[serde(default)]
    pub scripts: PatternList,
    #[serde(default)]
    pub css: PatternList,

    // 关联规则，原样输出
    #[serde(default)]
    pub excludes: PatternList,
    #[serde(default)]
    pub implies: PatternList,
}

/// 完整指纹库
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: HashMap<String, Category>,
    #[serde(default)]
    pub technologies: HashMap<String, Technology>,
}

impl Catalog {
    /// 根据分类ID获取分类名称，不存在时返回空字符串
    pub fn category_name(&self, id: u32) -> String {
        self.categories
            .get(&id.to_string())
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }
}
