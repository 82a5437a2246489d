//! Directed rule graph with a reader and writer for the DOT subset that
//! `snakemake --rulegraph` / `--dag` emit.
//!
//! Supported: `[strict] digraph [name] { ... }` with graph/node/edge default
//! attribute statements, `key = value` graph attributes, node statements with
//! attribute lists and `a -> b -> c` edge chains. Comments (`//`, `/* */`,
//! and `#` lines) are skipped. Subgraphs and undirected graphs are rejected.

use crate::utils::error::{EcUtilsError, Result};

const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

pub type Attributes = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub attrs: Attributes,
}

impl Node {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub attrs: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleGraph {
    pub name: Option<String>,
    pub graph_attrs: Attributes,
    pub node_defaults: Attributes,
    pub edge_defaults: Attributes,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl RuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    /// 新增節點；已存在時合併屬性
    pub fn add_node(&mut self, id: &str, attrs: Attributes) {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => merge_attrs(&mut node.attrs, attrs),
            None => self.nodes.push(Node {
                id: id.to_string(),
                attrs,
            }),
        }
    }

    /// 新增邊，端點不存在時自動建立
    pub fn add_edge(&mut self, from: &str, to: &str, attrs: Attributes) {
        for id in [from, to] {
            if !self.has_node(id) {
                self.add_node(id, Vec::new());
            }
        }
        match self
            .edges
            .iter_mut()
            .find(|e| e.from == from && e.to == to)
        {
            Some(edge) => merge_attrs(&mut edge.attrs, attrs),
            None => self.edges.push(Edge {
                from: from.to_string(),
                to: to.to_string(),
                attrs,
            }),
        }
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) {
        self.edges.retain(|e| !(e.from == from && e.to == to));
    }

    /// 移除節點及其所有相連的邊
    pub fn remove_node(&mut self, id: &str) {
        self.nodes.retain(|n| n.id != id);
        self.edges.retain(|e| e.from != id && e.to != id);
    }

    /// 節點標籤，去除殘留的引號
    pub fn label(&self, id: &str) -> Option<String> {
        self.node(id)
            .and_then(|n| n.attr("label"))
            .map(|label| label.replace('"', ""))
    }

    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        Parser::new(tokens).parse_graph()
    }

    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph");
        if let Some(name) = &self.name {
            out.push(' ');
            out.push_str(&quote_id(name));
        }
        out.push_str(" {\n");

        for (keyword, attrs) in [
            ("graph", &self.graph_attrs),
            ("node", &self.node_defaults),
            ("edge", &self.edge_defaults),
        ] {
            if !attrs.is_empty() {
                out.push_str(&format!("    {}[{}];\n", keyword, format_attrs(attrs)));
            }
        }

        for node in &self.nodes {
            if node.attrs.is_empty() {
                out.push_str(&format!("    {};\n", quote_id(&node.id)));
            } else {
                out.push_str(&format!(
                    "    {}[{}];\n",
                    quote_id(&node.id),
                    format_attrs(&node.attrs)
                ));
            }
        }

        for edge in &self.edges {
            out.push_str(&format!(
                "    {} -> {}",
                quote_id(&edge.from),
                quote_id(&edge.to)
            ));
            if !edge.attrs.is_empty() {
                out.push_str(&format!("[{}]", format_attrs(&edge.attrs)));
            }
            out.push_str(";\n");
        }

        out.push_str("}\n");
        out
    }
}

fn merge_attrs(target: &mut Attributes, attrs: Attributes) {
    for (key, value) in attrs {
        match target.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => target.push((key, value)),
        }
    }
}

fn format_attrs(attrs: &Attributes) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!("{}={}", quote_id(k), quote_value(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 純英數字 ID 或數字不需要引號
fn is_plain_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(_) => {
            let digits = id.strip_prefix('-').unwrap_or(id);
            !digits.is_empty()
                && digits.chars().any(|c| c.is_ascii_digit())
                && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
                && digits.matches('.').count() <= 1
        }
        None => false,
    }
}

fn quote_id(id: &str) -> String {
    if is_plain_id(id) && !KEYWORDS.contains(&id.to_lowercase().as_str()) {
        id.to_string()
    } else {
        quote_value(id)
    }
}

// DOT 字串中只有 \" 是跳脫字元，其餘反斜線留給 graphviz 解讀
fn quote_value(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Id(String),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equals,
    Semicolon,
    Comma,
    Arrow,
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;
    let mut at_line_start = true;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            at_line_start = true;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // '#' 開頭的行視為前處理器輸出，忽略
        if c == '#' && at_line_start {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        at_line_start = false;

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(EcUtilsError::DotParseError {
                            line,
                            message: "unterminated comment".to_string(),
                        })
                    }
                    Some('*') if chars.get(i + 1) == Some(&'/') => {
                        i += 2;
                        break;
                    }
                    Some('\n') => {
                        line += 1;
                        i += 1;
                    }
                    Some(_) => i += 1,
                }
            }
            continue;
        }

        let simple = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '=' => Some(Token::Equals),
            ';' => Some(Token::Semicolon),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = simple {
            tokens.push((token, line));
            i += 1;
            continue;
        }

        if c == '-' && chars.get(i + 1) == Some(&'>') {
            tokens.push((Token::Arrow, line));
            i += 2;
            continue;
        }
        if c == '-' && chars.get(i + 1) == Some(&'-') {
            return Err(EcUtilsError::DotParseError {
                line,
                message: "undirected edges are not supported".to_string(),
            });
        }

        if c == '"' {
            let start_line = line;
            let mut value = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(EcUtilsError::DotParseError {
                            line: start_line,
                            message: "unterminated string".to_string(),
                        })
                    }
                    Some('"') => {
                        i += 1;
                        break;
                    }
                    Some('\\') if chars.get(i + 1) == Some(&'"') => {
                        value.push('"');
                        i += 2;
                    }
                    // 行尾的反斜線代表續行
                    Some('\\') if chars.get(i + 1) == Some(&'\n') => {
                        line += 1;
                        i += 2;
                    }
                    Some(&ch) => {
                        if ch == '\n' {
                            line += 1;
                        }
                        value.push(ch);
                        i += 1;
                    }
                }
            }
            tokens.push((Token::Id(value), start_line));
            continue;
        }

        if c.is_alphanumeric() || c == '_' || c == '.' || c == '-' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            if i == start {
                // 負數
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i == start + 1 {
                    return Err(EcUtilsError::DotParseError {
                        line,
                        message: "unexpected character '-'".to_string(),
                    });
                }
            }
            tokens.push((Token::Id(chars[start..i].iter().collect()), line));
            continue;
        }

        return Err(EcUtilsError::DotParseError {
            line,
            message: format!("unexpected character '{}'", c),
        });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, usize)>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    fn error(&self, message: impl Into<String>) -> EcUtilsError {
        EcUtilsError::DotParseError {
            line: self.line(),
            message: message.into(),
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => {
                self.pos -= 1;
                Err(self.error(format!("expected {:?}, found {:?}", expected, token)))
            }
            None => Err(self.error(format!("expected {:?}, found end of input", expected))),
        }
    }

    fn expect_id(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Id(id)) => Ok(id),
            Some(token) => {
                self.pos -= 1;
                Err(self.error(format!("expected identifier, found {:?}", token)))
            }
            None => Err(self.error("expected identifier, found end of input")),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Id(id)) if id.eq_ignore_ascii_case(keyword))
    }

    fn parse_graph(mut self) -> Result<RuleGraph> {
        let mut graph = RuleGraph::new();

        if self.peek_keyword("strict") {
            self.pos += 1;
        }
        if self.peek_keyword("graph") {
            return Err(self.error("undirected graphs are not supported"));
        }
        if !self.peek_keyword("digraph") {
            return Err(self.error("expected 'digraph'"));
        }
        self.pos += 1;

        if let Some(Token::Id(_)) = self.peek() {
            graph.name = Some(self.expect_id()?);
        }
        self.expect(Token::LBrace)?;

        loop {
            match self.peek() {
                None => return Err(self.error("missing closing '}'")),
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Semicolon) => {
                    self.pos += 1;
                }
                Some(_) => self.parse_statement(&mut graph)?,
            }
        }

        if self.peek().is_some() {
            return Err(self.error("unexpected content after graph"));
        }

        Ok(graph)
    }

    fn parse_statement(&mut self, graph: &mut RuleGraph) -> Result<()> {
        if self.peek_keyword("subgraph") || matches!(self.peek(), Some(Token::LBrace)) {
            return Err(self.error("subgraphs are not supported"));
        }

        for keyword in ["graph", "node", "edge"] {
            if self.peek_keyword(keyword)
                && matches!(self.tokens.get(self.pos + 1), Some((Token::LBracket, _)))
            {
                self.pos += 1;
                let attrs = self.parse_attr_lists()?;
                let target = match keyword {
                    "graph" => &mut graph.graph_attrs,
                    "node" => &mut graph.node_defaults,
                    _ => &mut graph.edge_defaults,
                };
                merge_attrs(target, attrs);
                return Ok(());
            }
        }

        let first = self.expect_id()?;

        // 圖層級的 key = value
        if matches!(self.peek(), Some(Token::Equals)) {
            self.pos += 1;
            let value = self.expect_id()?;
            merge_attrs(&mut graph.graph_attrs, vec![(first, value)]);
            return Ok(());
        }

        let mut chain = vec![first];
        while matches!(self.peek(), Some(Token::Arrow)) {
            self.pos += 1;
            chain.push(self.expect_id()?);
        }

        let attrs = if matches!(self.peek(), Some(Token::LBracket)) {
            self.parse_attr_lists()?
        } else {
            Vec::new()
        };

        if chain.len() == 1 {
            graph.add_node(&chain[0], attrs);
        } else {
            for pair in chain.windows(2) {
                graph.add_edge(&pair[0], &pair[1], attrs.clone());
            }
        }

        Ok(())
    }

    fn parse_attr_lists(&mut self) -> Result<Attributes> {
        let mut attrs = Vec::new();
        while matches!(self.peek(), Some(Token::LBracket)) {
            self.pos += 1;
            loop {
                match self.peek() {
                    Some(Token::RBracket) => {
                        self.pos += 1;
                        break;
                    }
                    Some(Token::Comma) | Some(Token::Semicolon) => {
                        self.pos += 1;
                    }
                    Some(Token::Id(_)) => {
                        let key = self.expect_id()?;
                        let value = if matches!(self.peek(), Some(Token::Equals)) {
                            self.pos += 1;
                            self.expect_id()?
                        } else {
                            "true".to_string()
                        };
                        merge_attrs(&mut attrs, vec![(key, value)]);
                    }
                    Some(token) => {
                        let message = format!("unexpected {:?} in attribute list", token);
                        return Err(self.error(message));
                    }
                    None => return Err(self.error("unterminated attribute list")),
                }
            }
        }
        Ok(attrs)
    }
}
