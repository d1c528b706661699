use crate::error::{Result, TranscodeError};

/// Element tree used as the XML object model for both transcode directions.
/// Attribute insertion order is preserved and carried through to the
/// serialized output.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Replaces an existing attribute in place, otherwise appends it.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_attribute(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let replaced = [
            ("&amp;", "&"),
            ("&lt;", "<"),
            ("&gt;", ">"),
            ("&quot;", "\""),
            ("&apos;", "'"),
        ]
        .iter()
        .find(|(entity, _)| rest.starts_with(entity));
        match replaced {
            Some((entity, ch)) => {
                out.push_str(ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Serializes a node tree to indented XML text. Every open tag sits on its
/// own line, attributes each on their own line one level deeper, children one
/// level deeper than their parent. A node without children self-closes.
pub fn serialize(node: &XmlNode, indent_spaces: usize) -> String {
    let mut out = String::new();
    write_node(node, 0, indent_spaces, &mut out);
    out
}

fn write_node(node: &XmlNode, depth: usize, indent_spaces: usize, out: &mut String) {
    let istr = " ".repeat(depth * indent_spaces);
    out.push_str(&istr);
    out.push('<');
    out.push_str(&node.tag);
    if !node.attributes.is_empty() {
        for (name, value) in &node.attributes {
            out.push('\n');
            out.push_str(&" ".repeat(indent_spaces));
            out.push_str(&istr);
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }
    if node.children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for child in &node.children {
        write_node(child, depth + 1, indent_spaces, out);
    }
    out.push_str(&istr);
    out.push_str("</");
    out.push_str(&node.tag);
    out.push_str(">\n");
}

/// Parses XML text into a node tree and returns the first top-level element.
/// Text content between tags is not modeled: whitespace is skipped and any
/// other character data is dropped.
pub fn parse(text: &str) -> Result<XmlNode> {
    let mut scanner = Scanner::new(text);
    let mut builder = DomBuilder::new();
    scanner.run(&mut builder)?;
    builder
        .into_roots()
        .into_iter()
        .next()
        .ok_or_else(|| TranscodeError::malformed_xml("", "no root element"))
}

/// Single-pass scanner recognizing processing instructions, comments, end
/// tags and start/self-closing tags. No schema validation, no DTDs.
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn has_chars(&self, chars: &str) -> bool {
        self.rest().starts_with(chars)
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.text.len());
    }

    fn read_until(&mut self, delim: &str, context: &str) -> Result<&'a str> {
        match self.rest().find(delim) {
            Some(offset) => {
                let out = &self.rest()[..offset];
                self.pos += offset;
                Ok(out)
            }
            None => Err(TranscodeError::malformed_xml(
                context,
                format!("expected to find '{delim}'"),
            )),
        }
    }

    fn read_tag_name(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let end = rest
            .find(|ch: char| ch.is_whitespace() || ch == '/' || ch == '>')
            .ok_or_else(|| TranscodeError::malformed_xml("", "unterminated start tag"))?;
        let name = &rest[..end];
        self.pos += end;
        Ok(name)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_whitespace()) {
            self.advance(1);
        }
    }

    fn skip_text_content(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '<' {
                break;
            }
            self.advance(ch.len_utf8());
        }
    }

    fn run(&mut self, builder: &mut DomBuilder) -> Result<()> {
        while self.pos < self.text.len() {
            self.skip_text_content();
            if self.pos >= self.text.len() {
                break;
            }
            if self.has_chars("<?") {
                self.advance(2);
                self.read_until("?>", "?")?;
                self.advance(2);
            } else if self.has_chars("<!--") {
                self.advance(4);
                self.read_until("-->", "!--")?;
                self.advance(3);
            } else if self.has_chars("</") {
                self.advance(2);
                let tag = self.read_until(">", "/")?.trim().to_string();
                self.advance(1);
                builder.end_element(&tag);
            } else {
                // start or self-closing tag
                self.advance(1);
                let tag = self.read_tag_name()?.trim().to_string();
                let mut attributes = Vec::new();
                self.skip_whitespace();
                while self.peek() != Some('/') && self.peek() != Some('>') {
                    let name = self.read_until("=", &tag)?.trim().to_string();
                    self.advance(1);
                    self.skip_whitespace();
                    if self.peek() != Some('"') {
                        return Err(TranscodeError::malformed_xml(
                            tag,
                            format!("attribute '{name}' value must be double-quoted"),
                        ));
                    }
                    self.advance(1);
                    let value = self.read_until("\"", &tag)?;
                    self.advance(1);
                    attributes.push((name, unescape_attribute(value)));
                    self.skip_whitespace();
                }
                builder.start_element(&tag, attributes);
                if self.peek() == Some('/') {
                    self.advance(1);
                    builder.end_element(&tag);
                }
                if self.peek() != Some('>') {
                    return Err(TranscodeError::malformed_xml(tag, "unterminated tag"));
                }
                self.advance(1);
            }
        }
        Ok(())
    }
}

struct DomBuilder {
    roots: Vec<XmlNode>,
    stack: Vec<XmlNode>,
}

impl DomBuilder {
    fn new() -> Self {
        Self {
            roots: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn start_element(&mut self, tag: &str, attributes: Vec<(String, String)>) {
        self.stack.push(XmlNode {
            tag: tag.to_string(),
            attributes,
            children: Vec::new(),
        });
    }

    fn end_element(&mut self, _tag: &str) {
        let Some(node) = self.stack.pop() else {
            return;
        };
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn into_roots(mut self) -> Vec<XmlNode> {
        // unterminated elements still become part of the tree
        while !self.stack.is_empty() {
            let tag = self.stack.last().map(|n| n.tag.clone()).unwrap_or_default();
            self.end_element(&tag);
        }
        self.roots
    }
}
