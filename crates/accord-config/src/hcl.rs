//! Minimal HCL writer for generated Terraform configuration.

use std::fmt::Write as _;

/// A value on the right-hand side of an HCL attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HclValue {
    /// Literal string; quotes, backslashes and `${` are escaped.
    String(String),
    /// Quoted template, rendered verbatim between quotes (`"${var.a}.${var.b}"`).
    Template(String),
    /// Bare expression (`var.subnet_cidr_block`, `oci_core_vcn.test_vcn.id`).
    Expr(String),
    Bool(bool),
    Number(i64),
    List(Vec<HclValue>),
    /// Object constructor. Keys containing `${` are rendered as templates.
    Map(Vec<(String, HclValue)>),
}

impl HclValue {
    pub fn expr(e: impl Into<String>) -> Self {
        HclValue::Expr(e.into())
    }

    pub fn template(t: impl Into<String>) -> Self {
        HclValue::Template(t.into())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, HclValue)>) -> Self {
        HclValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn render(&self) -> String {
        match self {
            HclValue::String(s) => format!("\"{}\"", escape(s)),
            HclValue::Template(t) => format!("\"{}\"", t),
            HclValue::Expr(e) => e.clone(),
            HclValue::Bool(b) => b.to_string(),
            HclValue::Number(n) => n.to_string(),
            HclValue::List(items) => {
                let inner: Vec<String> = items.iter().map(HclValue::render).collect();
                format!("[{}]", inner.join(", "))
            }
            HclValue::Map(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{} = {}", render_key(k), v.render()))
                    .collect();
                format!("{{ {} }}", inner.join(", "))
            }
        }
    }
}

impl From<&str> for HclValue {
    fn from(s: &str) -> Self {
        HclValue::String(s.to_string())
    }
}

impl From<String> for HclValue {
    fn from(s: String) -> Self {
        HclValue::String(s)
    }
}

impl From<bool> for HclValue {
    fn from(b: bool) -> Self {
        HclValue::Bool(b)
    }
}

impl From<i64> for HclValue {
    fn from(n: i64) -> Self {
        HclValue::Number(n)
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("${", "$${")
        .replace('\n', "\\n")
}

fn render_key(key: &str) -> String {
    if key.contains("${") {
        format!("\"{}\"", key)
    } else {
        format!("\"{}\"", escape(key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BodyItem {
    Attr(String, HclValue),
    Block(Block),
    Comment(String),
    Blank,
}

/// A labelled HCL block (`resource "type" "name" { ... }`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    kind: String,
    labels: Vec<String>,
    body: Vec<BodyItem>,
}

impl Block {
    pub fn new(kind: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            kind: kind.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            body: Vec::new(),
        }
    }

    pub fn resource(resource_type: &str, name: &str) -> Self {
        Self::new("resource", &[resource_type, name])
    }

    pub fn data(resource_type: &str, name: &str) -> Self {
        Self::new("data", &[resource_type, name])
    }

    pub fn variable(name: &str) -> Self {
        Self::new("variable", &[name])
    }

    pub fn provider(name: &str) -> Self {
        Self::new("provider", &[name])
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<HclValue>) -> Self {
        self.body.push(BodyItem::Attr(name.into(), value.into()));
        self
    }

    /// Attribute holding a bare expression.
    pub fn expr(self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.attr(name, HclValue::Expr(expression.into()))
    }

    pub fn block(mut self, nested: Block) -> Self {
        self.body.push(BodyItem::Block(nested));
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.body.push(BodyItem::Comment(text.into()));
        self
    }

    pub fn blank(mut self) -> Self {
        self.body.push(BodyItem::Blank);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        let _ = write!(out, "{}{}", pad, self.kind);
        for label in &self.labels {
            let _ = write!(out, " \"{}\"", escape(label));
        }
        if self.body.is_empty() {
            out.push_str(" {}\n");
            return;
        }
        out.push_str(" {\n");
        for item in &self.body {
            match item {
                BodyItem::Attr(name, value) => {
                    let _ = writeln!(out, "{}  {} = {}", pad, name, value.render());
                }
                BodyItem::Block(nested) => nested.render_into(out, depth + 1),
                BodyItem::Comment(text) => {
                    let _ = writeln!(out, "{}  #{}", pad, text);
                }
                BodyItem::Blank => out.push('\n'),
            }
        }
        let _ = writeln!(out, "{}}}", pad);
    }
}
