/// Minimal HTML node tree with a single escaping serializer

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
    /// Raw text content for elements like `<style>` whose body is produced
    /// by another trusted serializer.
    pub raw: Option<String>,
}

/// Void elements never get a closing tag.
const VOID_TAGS: &[&str] = &["meta", "link", "img", "br"];

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
            raw: None,
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn class(self, name: &'static str) -> Self {
        self.attr("class", name)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub(crate) fn raw(mut self, body: String) -> Self {
        self.raw = Some(body);
        self
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, out);
            out.push('"');
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }

        if let Some(raw) = &self.raw {
            out.push_str(raw);
        }
        for child in &self.children {
            child.write_to(out);
        }

        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl Node {
    fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.write_to(out),
            Node::Text(t) => escape_into(t, out),
        }
    }
}

/// Serialize a document rooted at `<html>`, prefixed with the doctype.
pub fn to_html(root: &Element) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    root.write_to(&mut out);
    out
}

/// Escape text for use in HTML text content or quoted attribute values.
fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
