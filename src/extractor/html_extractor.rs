//! HTML标签提取器
//! 负责从HTML中按文档顺序提取 a-href、script-src 和 stylesheet-href

use std::cell::RefCell;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts
};
use html5ever::tokenizer::states::RawKind;
use markup5ever::interface::Attribute;
use tendril::StrTendril;

#[derive(Debug, Default, Clone)]
pub struct HtmlExtractor {
    anchor_hrefs: RefCell<Vec<String>>,
    script_srcs: RefCell<Vec<String>>,
    stylesheet_hrefs: RefCell<Vec<String>>,
}

impl TokenSink for HtmlExtractor {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        {
            match name.as_ref() {
                "a" => self.extract_anchor(&attrs),
                "link" => self.extract_stylesheet(&attrs),
                "script" => {
                    self.extract_script_src(&attrs);
                    // 脚本内容按原始文本处理，避免把字符串里的 <a href> 当成标签
                    return TokenSinkResult::RawData(RawKind::ScriptData);
                }
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                    return TokenSinkResult::RawData(RawKind::Rawtext);
                }
                "title" | "textarea" => return TokenSinkResult::RawData(RawKind::Rcdata),
                _ => {}
            }
        }
        TokenSinkResult::Continue
    }
}

impl HtmlExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self::default()
    }

    /// 对整段HTML做一次词法扫描，返回收集结果
    pub fn extract(&self, html: &str) -> Self {
        let tokenizer = Tokenizer::new(self.clone(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink
    }

    fn attr_value<'a>(attrs: &'a [Attribute], key: &str) -> Option<&'a str> {
        attrs
            .iter()
            .find(|attr| attr.name.local.as_ref() == key)
            .map(|attr| &*attr.value)
    }

    fn extract_anchor(&self, attrs: &[Attribute]) {
        if let Some(href) = Self::attr_value(attrs, "href") {
            self.anchor_hrefs.borrow_mut().push(href.to_string());
        }
    }

    /// 提取script-src
    fn extract_script_src(&self, attrs: &[Attribute]) {
        if let Some(src) = Self::attr_value(attrs, "src") {
            self.script_srcs.borrow_mut().push(src.to_string());
        }
    }

    /// 仅 rel="stylesheet" 的 link 标签
    fn extract_stylesheet(&self, attrs: &[Attribute]) {
        if Self::attr_value(attrs, "rel") != Some("stylesheet") {
            return;
        }
        if let Some(href) = Self::attr_value(attrs, "href") {
            self.stylesheet_hrefs.borrow_mut().push(href.to_string());
        }
    }

    /// 获取提取到的a-href列表
    pub fn get_anchor_hrefs(&self) -> Vec<String> {
        self.anchor_hrefs.borrow().clone()
    }

    /// 获取提取到的script-src列表
    pub fn get_script_srcs(&self) -> Vec<String> {
        self.script_srcs.borrow().clone()
    }

    pub fn get_stylesheet_hrefs(&self) -> Vec<String> {
        self.stylesheet_hrefs.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refs_in_document_order() {
        let html = r#"
            <link rel="stylesheet" href="/main.css">
            <link rel="icon" href="/favicon.ico">
            <script src="/static/jquery-3.7.1.js"></script>
            <a href="/about">About</a>
            <script src="https://cdn.test/vue.js"></script>
            <a name="anchor-without-href"></a>
            <a href="https://other.test/x">Other</a>
        "#;

        let result = HtmlExtractor::new().extract(html);

        assert_eq!(
            result.get_script_srcs(),
            vec!["/static/jquery-3.7.1.js".to_string(), "https://cdn.test/vue.js".to_string()]
        );
        assert_eq!(
            result.get_anchor_hrefs(),
            vec!["/about".to_string(), "https://other.test/x".to_string()]
        );
        assert_eq!(result.get_stylesheet_hrefs(), vec!["/main.css".to_string()]);
    }

    #[test]
    fn test_inline_script_is_not_tokenized() {
        let html = r#"
            <script>document.write('<a href="/fake">x</a>');</script>
            <a href="/real">real</a>
        "#;

        let result = HtmlExtractor::new().extract(html);
        assert_eq!(result.get_anchor_hrefs(), vec!["/real".to_string()]);
        assert!(result.get_script_srcs().is_empty());
    }

    #[test]
    fn test_rel_must_equal_stylesheet() {
        let html = r#"<link rel="alternate stylesheet" href="/alt.css"><link href="/x.css" rel="stylesheet">"#;
        let result = HtmlExtractor::new().extract(html);
        assert_eq!(result.get_stylesheet_hrefs(), vec!["/x.css".to_string()]);
    }
}
