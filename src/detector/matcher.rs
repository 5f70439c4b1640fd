//! 匹配维度
//! 六类检测信号按固定顺序依次匹配，首个命中的维度即判定技术存在

use std::fmt;

use regex::Regex;

use crate::compiler::CompiledTechnology;
use crate::crawler::Response;

/// 匹配维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchFamily {
    Headers,
    Cookies,
    ScriptUrls,
    ScriptBodies,
    Html,
    Styles,
}

impl MatchFamily {
    /// 匹配顺序
    pub const ORDER: [MatchFamily; 6] = [
        MatchFamily::Headers,
        MatchFamily::Cookies,
        MatchFamily::ScriptUrls,
        MatchFamily::ScriptBodies,
        MatchFamily::Html,
        MatchFamily::Styles,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MatchFamily::Headers => "headers",
            MatchFamily::Cookies => "cookies",
            MatchFamily::ScriptUrls => "scripts",
            MatchFamily::ScriptBodies => "js",
            MatchFamily::Html => "html",
            MatchFamily::Styles => "css",
        }
    }

    /// 判断技术在该维度上是否命中
    pub fn matches(self, tech: &CompiledTechnology, response: &Response) -> bool {
        match self {
            MatchFamily::Headers => Self::match_headers(tech, response),
            MatchFamily::Cookies => Self::match_cookies(tech, response),
            MatchFamily::ScriptUrls => Self::match_any(&tech.script_patterns, &response.script_links),
            MatchFamily::ScriptBodies => Self::match_any(&tech.js_patterns, &response.scripts),
            MatchFamily::Html => Self::match_any(&tech.html_patterns, std::slice::from_ref(&response.html)),
            MatchFamily::Styles => Self::match_any(&tech.css_patterns, &response.styles),
        }
    }

    /// 返回首个命中的维度
    pub fn first_match(tech: &CompiledTechnology, response: &Response) -> Option<MatchFamily> {
        Self::ORDER.into_iter().find(|family| family.matches(tech, response))
    }

    /// Header：名称存在且（规则为空 或 任一取值命中正则）
    fn match_headers(tech: &CompiledTechnology, response: &Response) -> bool {
        tech.header_rules.iter().any(|rule| {
            let mut values = response.headers.get_all(&rule.name).iter().peekable();
            if values.peek().is_none() {
                return false;
            }
            values.any(|value| rule.matcher.is_match(&String::from_utf8_lossy(value.as_bytes())))
        })
    }

    /// Cookie：按cookie名称查规则；规则正则作用于cookie名称而非取值
    fn match_cookies(tech: &CompiledTechnology, response: &Response) -> bool {
        response.cookies.iter().any(|cookie| {
            tech.cookie_rules
                .get(&cookie.name)
                .is_some_and(|matcher| matcher.is_match(&cookie.name))
        })
    }

    fn match_any(patterns: &[Regex], inputs: &[String]) -> bool {
        patterns
            .iter()
            .any(|regex| inputs.iter().any(|input| regex.is_match(input)))
    }
}

impl fmt::Display for MatchFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
