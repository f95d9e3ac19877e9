//! Parsing of expression references: `var.x`, `local.y`, `data.aws_ami.foo.id`,
//! `module.app.output_name`, `aws_instance.web.id`, `self.arn`, `count.index`,
//! `each.key`/`each.value`, and arbitrary attribute/index paths on any of
//! the above.

use crate::error::{Error, Result};

/// What kind of root symbol a reference starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceHead {
    Var(String),
    Local(String),
    Data { type_name: String, name: String },
    Module(String),
    SelfRef,
    CountIndex,
    EachKey,
    EachValue,
    /// `path.module`, `path.root`, or `path.cwd`.
    Path(String),
    /// `terraform.workspace`.
    Terraform(String),
    /// `<type>.<name>`, a reference to another resource's attribute.
    Resource { type_name: String, name: String },
}

/// One path step after the head: `.attr` or `[index]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Attr(String),
    Index(String),
}

/// A fully parsed reference expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    head: ReferenceHead,
    path: Vec<PathStep>,
}

impl Reference {
    pub fn head(&self) -> &ReferenceHead {
        &self.head
    }

    pub fn path(&self) -> &[PathStep] {
        &self.path
    }

    /// Tokenizes and classifies a raw reference string.
    pub fn parse(raw: &str) -> Result<Self> {
        let tokens = tokenize(raw)?;
        if tokens.is_empty() {
            return Err(Error::InvalidAddress(raw.to_string()));
        }
        classify(&tokens, raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Index(String),
}

/// Splits on `.` while tracking `[...]` bracket depth so that an
/// index like `["a.b"]` isn't mistaken for two attribute steps.
fn tokenize(raw: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '[' => {
                if depth == 0 {
                    if !current.is_empty() {
                        tokens.push(Token::Ident(std::mem::take(&mut current)));
                    }
                } else {
                    current.push(c);
                }
                depth += 1;
                if depth > 1 {
                    // nested bracket content kept verbatim below
                }
            }
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(Error::InvalidAddress(raw.to_string()));
                }
                if depth == 0 {
                    let inner = std::mem::take(&mut current);
                    let trimmed = inner.trim();
                    let unquoted = if trimmed.len() >= 2
                        && trimmed.starts_with('"')
                        && trimmed.ends_with('"')
                    {
                        trimmed[1..trimmed.len() - 1].to_string()
                    } else {
                        trimmed.to_string()
                    };
                    tokens.push(Token::Index(unquoted));
                } else {
                    current.push(c);
                }
            }
            '.' if depth == 0 => {
                if !current.is_empty() {
                    tokens.push(Token::Ident(std::mem::take(&mut current)));
                }
            }
            _ => current.push(c),
        }
        i += 1;
    }
    if depth != 0 {
        return Err(Error::InvalidAddress(raw.to_string()));
    }
    if !current.is_empty() {
        tokens.push(Token::Ident(current));
    }
    Ok(tokens)
}

fn classify(tokens: &[Token], raw: &str) -> Result<Reference> {
    let ident_at = |i: usize| -> Result<&str> {
        match tokens.get(i) {
            Some(Token::Ident(s)) => Ok(s.as_str()),
            _ => Err(Error::InvalidAddress(raw.to_string())),
        }
    };

    let head_word = ident_at(0)?;
    let (head, consumed) = match head_word {
        "var" => (ReferenceHead::Var(ident_at(1)?.to_string()), 2),
        "local" => (ReferenceHead::Local(ident_at(1)?.to_string()), 2),
        "data" => {
            let type_name = ident_at(1)?.to_string();
            let name = ident_at(2)?.to_string();
            (ReferenceHead::Data { type_name, name }, 3)
        }
        "module" => (ReferenceHead::Module(ident_at(1)?.to_string()), 2),
        "self" => (ReferenceHead::SelfRef, 1),
        "count" => {
            if ident_at(1)? != "index" {
                return Err(Error::InvalidAddress(raw.to_string()));
            }
            (ReferenceHead::CountIndex, 2)
        }
        "each" => match ident_at(1)? {
            "key" => (ReferenceHead::EachKey, 2),
            "value" => (ReferenceHead::EachValue, 2),
            _ => return Err(Error::InvalidAddress(raw.to_string())),
        },
        "path" => match ident_at(1)? {
            "module" | "root" | "cwd" => (ReferenceHead::Path(ident_at(1)?.to_string()), 2),
            _ => return Err(Error::InvalidAddress(raw.to_string())),
        },
        "terraform" => {
            if ident_at(1)? != "workspace" {
                return Err(Error::InvalidAddress(raw.to_string()));
            }
            (ReferenceHead::Terraform("workspace".to_string()), 2)
        }
        type_name => {
            let name = ident_at(1)?.to_string();
            (
                ReferenceHead::Resource {
                    type_name: type_name.to_string(),
                    name,
                },
                2,
            )
        }
    };

    let mut path = Vec::new();
    for tok in &tokens[consumed..] {
        match tok {
            Token::Ident(s) => path.push(PathStep::Attr(s.clone())),
            Token::Index(s) => path.push(PathStep::Index(s.clone())),
        }
    }

    Ok(Reference { head, path })
}
