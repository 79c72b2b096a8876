//! Declarative descriptions of widget trees.
//!
//! A description is a tree of named nodes. Nodes whose name starts with a lowercase letter are
//! properties (`dimX{100}`), nodes starting with anything else are widgets (`ColorBox{...}`).
//! A property's value is the name of its first child.
//!
//! ```text
//! VerticalContainer{
//!     dimX{200} dimY{100}
//!     // a fixed-height header
//!     ColorBox{ color{ff0000ff} layout{ dimX{max} dimY{20} } }
//!     VerticalList{ layout{ dimX{max} dimY{0} weight{1} } }
//! }
//! ```

use logos::Logos;

use crate::*;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Desc {
    pub value: String,
    pub children: Vec<Desc>,
}

impl Desc {
    pub fn new(value: impl Into<String>) -> Self {
        return Self {
            value: value.into(),
            children: Vec::new(),
        };
    }

    /// Builder helper: append a child node.
    pub fn child(mut self, child: Desc) -> Self {
        self.children.push(child);
        return self;
    }

    /// Builder helper: append a `name{value}` property.
    pub fn prop(self, name: &str, value: impl Into<String>) -> Self {
        return self.child(Desc::new(name).child(Desc::new(value)));
    }

    pub fn is_property(&self) -> bool {
        return self.value.starts_with(|c: char| c.is_ascii_lowercase());
    }

    /// The first child named `name`.
    pub fn property(&self, name: &str) -> Option<&Desc> {
        return self.children.iter().find(|c| c.value == name);
    }

    /// The value of the `name` property.
    pub fn property_value(&self, name: &str) -> Option<&Desc> {
        return self.property(name)?.children.first();
    }

    /// Child nodes that describe widgets rather than properties.
    pub fn widgets(&self) -> impl Iterator<Item = &Desc> {
        return self.children.iter().filter(|c| !c.is_property());
    }

    pub fn as_str(&self) -> &str {
        return &self.value;
    }

    pub fn as_f32(&self) -> Option<f32> {
        return self.value.parse().ok();
    }

    pub fn as_u32(&self) -> Option<u32> {
        return self.value.parse().ok();
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value.as_str() {
            "true" => return Some(true),
            "false" => return Some(false),
            _ => return None,
        }
    }

    /// Parse a description text into its top-level nodes.
    pub fn parse(text: &str) -> Result<Vec<Desc>> {
        // the bottom of the stack collects the top-level nodes
        let mut stack = vec![Desc::default()];
        let mut lexer = Token::lexer(text);

        while let Some(token) = lexer.next() {
            let offset = lexer.span().start;
            match token {
                Ok(Token::Word(word)) | Ok(Token::Quoted(word)) => {
                    let top = stack.len() - 1;
                    stack[top].children.push(Desc::new(word));
                }
                Ok(Token::BraceOpen) => {
                    let top = stack.len() - 1;
                    let Some(node) = stack[top].children.pop() else {
                        return Err(parse_error("'{' must follow a node name", offset));
                    };
                    stack.push(node);
                }
                Ok(Token::BraceClose) => {
                    if stack.len() == 1 {
                        return Err(parse_error("unmatched '}'", offset));
                    }
                    if let Some(node) = stack.pop() {
                        let top = stack.len() - 1;
                        stack[top].children.push(node);
                    }
                }
                Err(()) => {
                    return Err(parse_error("unexpected character", offset));
                }
            }
        }

        if stack.len() > 1 {
            return Err(parse_error("unclosed '{'", text.len()));
        }

        return Ok(stack.pop().map(|root| root.children).unwrap_or_default());
    }

    /// Parse a text that must contain exactly one top-level node.
    pub fn parse_one(text: &str) -> Result<Desc> {
        let mut nodes = Desc::parse(text)?;
        if nodes.len() != 1 {
            return Err(parse_error(
                &format!("expected one top-level node, found {}", nodes.len()),
                0,
            ));
        }
        return Ok(nodes.remove(0));
    }
}

fn parse_error(message: &str, offset: usize) -> Error {
    return Error::Parse {
        message: message.to_string(),
        offset,
    };
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(skip r"//[^\n]*")]
enum Token {
    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    Quoted(String),

    #[regex(r#"[^ \t\n\r{}"/]+"#, |lex| lex.slice().to_string())]
    Word(String),
}
