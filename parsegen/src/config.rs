//! Grammar-description parser.
//!
//! Turns the textual grammar DSL into a neutral [`GrammarConfig`] record:
//! six ordered lists of raw definitions with all names still unresolved.
//! The meta-info resolver consumes the record and discards it.
//!
//! The language is whitespace-insensitive and `#` starts a comment that
//! runs to the end of the line. Directives:
//!
//! ```text
//! token name = "regex";          ignore name = "regex";
//! enum Name { V1; V2; }
//! base Name;
//! node Name [: Base] { TypeSpec field; ... }
//! rule Name : TypeSpec
//!     = Sym1[mark] Sym2[mark] ... [-> Hint]
//!     = ...
//!     ;
//! ```
//!
//! with `TypeSpec := ident ['vec|'opt]`, mark one of `!`, `&`, `:field`,
//! and `Hint` one of `_`, a type name, an enum value, or `_'opt`.

use smartstring::alias::String;

use crate::error::BuildError;

/// A type name plus its raw qualifier text (`""`, `"vec"` or `"opt"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualType {
    pub name: String,
    pub qual: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDef {
    pub name: String,
    /// Regex literal with the surrounding quotes removed and `""` collapsed.
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMember {
    pub spec: QualType,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDef {
    pub name: String,
    pub parent: Option<String>,
    pub members: Vec<NodeMember>,
}

/// Assignment mark attached to one rhs symbol of a rule alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMark {
    /// No mark.
    None,
    /// `!` — this symbol's item is the alternative's result.
    Select,
    /// `&` — push this symbol's item into the produced vector.
    Merge,
    /// `:field` — assign this symbol's item into the named member.
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSymbol {
    pub symbol: String,
    pub mark: RuleMark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleAlt {
    pub rhs: Vec<RuleSymbol>,
    pub hint: Option<QualType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDef {
    pub name: String,
    pub spec: QualType,
    pub alts: Vec<RuleAlt>,
}

/// The parsed grammar description, still name-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarConfig {
    pub tokens: Vec<TokenDef>,
    pub ignored_tokens: Vec<TokenDef>,
    pub enums: Vec<EnumDef>,
    pub bases: Vec<BaseDef>,
    pub nodes: Vec<NodeDef>,
    pub rules: Vec<RuleDef>,
}

/// Parses a grammar description. Pure: no side effects, input untouched.
pub fn parse_config(text: &str) -> Result<GrammarConfig, BuildError> {
    let mut reader = Reader { text, bytes: text.as_bytes(), pos: 0 };
    let mut config = GrammarConfig::default();

    reader.skip_trivia();
    while !reader.at_end() {
        let directive = reader.parse_identifier("expecting a directive")?;
        match directive.as_str() {
            "token" => config.tokens.push(parse_token_def(&mut reader)?),
            "ignore" => config.ignored_tokens.push(parse_token_def(&mut reader)?),
            "enum" => config.enums.push(parse_enum_def(&mut reader)?),
            "base" => config.bases.push(parse_base_def(&mut reader)?),
            "node" => config.nodes.push(parse_node_def(&mut reader)?),
            "rule" => config.rules.push(parse_rule_def(&mut reader)?),
            other => {
                return Err(reader.error_at(
                    format!("unknown directive {other:?}"),
                    reader.pos - other.len(),
                ))
            }
        }
        reader.skip_trivia();
    }

    Ok(config)
}

struct Reader<'s> {
    text: &'s str,
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Reader<'s> {
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.peek() == Some(b'#') {
                while !matches!(self.peek(), None | Some(b'\n')) {
                    self.pos += 1;
                }
            } else {
                return;
            }
        }
    }

    fn error(&self, message: impl Into<std::string::String>) -> BuildError {
        BuildError::syntax(message, self.text, self.pos)
    }

    fn error_at(&self, message: impl Into<std::string::String>, offset: usize) -> BuildError {
        BuildError::syntax(message, self.text, offset)
    }

    /// Consumes `expected` if it is next (after trivia); returns whether it
    /// was.
    fn try_consume(&mut self, expected: &str) -> bool {
        self.skip_trivia();
        if self.bytes[self.pos..].starts_with(expected.as_bytes()) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &str) -> Result<(), BuildError> {
        if self.try_consume(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expecting {expected:?}")))
        }
    }

    fn parse_identifier(&mut self, what: &str) -> Result<String, BuildError> {
        self.skip_trivia();
        self.parse_identifier_raw(what)
    }

    /// Identifier with no leading trivia skip (used after `'` and `:`).
    fn parse_identifier_raw(&mut self, what: &str) -> Result<String, BuildError> {
        if !matches!(self.peek(), Some(b) if b.is_ascii_alphabetic()) {
            return Err(self.error(what));
        }
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        Ok(String::from(&self.text[start..self.pos]))
    }

    /// Quoted string; `""` inside the body stands for one `"`.
    fn parse_string(&mut self) -> Result<String, BuildError> {
        self.skip_trivia();
        if self.peek() != Some(b'"') {
            return Err(self.error("expecting <string>"));
        }
        self.pos += 1;

        let mut buf = String::new();
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'"' {
                if self.peek() == Some(b'"') {
                    self.pos += 1;
                    buf.push('"');
                } else {
                    return Ok(buf);
                }
            } else {
                buf.push(b as char);
            }
        }
        Err(self.error("unterminated string"))
    }

    fn parse_type_spec(&mut self) -> Result<QualType, BuildError> {
        let name = self.parse_identifier("expecting <type>")?;
        let qual = self.parse_qualifier()?;
        Ok(QualType { name, qual })
    }

    /// The optional `'vec` / `'opt` tail of a type spec or hint.
    fn parse_qualifier(&mut self) -> Result<String, BuildError> {
        if self.peek() == Some(b'\'') {
            self.pos += 1;
            self.parse_identifier_raw("expecting <qualifier>")
        } else {
            Ok(String::new())
        }
    }
}

fn parse_token_def(reader: &mut Reader) -> Result<TokenDef, BuildError> {
    let name = reader.parse_identifier("expecting <identifier>")?;
    reader.expect("=")?;
    let regex = reader.parse_string()?;
    reader.expect(";")?;
    Ok(TokenDef { name, regex })
}

fn parse_enum_def(reader: &mut Reader) -> Result<EnumDef, BuildError> {
    let name = reader.parse_identifier("expecting <identifier>")?;
    reader.expect("{")?;
    let mut values = Vec::new();
    while !reader.try_consume("}") {
        values.push(reader.parse_identifier("expecting <identifier>")?);
        reader.expect(";")?;
    }
    Ok(EnumDef { name, values })
}

fn parse_base_def(reader: &mut Reader) -> Result<BaseDef, BuildError> {
    let name = reader.parse_identifier("expecting <identifier>")?;
    reader.expect(";")?;
    Ok(BaseDef { name })
}

fn parse_node_def(reader: &mut Reader) -> Result<NodeDef, BuildError> {
    let name = reader.parse_identifier("expecting <identifier>")?;
    let parent = if reader.try_consume(":") {
        Some(reader.parse_identifier("expecting <base>")?)
    } else {
        None
    };

    reader.expect("{")?;
    let mut members = Vec::new();
    while !reader.try_consume("}") {
        let spec = reader.parse_type_spec()?;
        let name = reader.parse_identifier("expecting <identifier>")?;
        reader.expect(";")?;
        members.push(NodeMember { spec, name });
    }
    Ok(NodeDef { name, parent, members })
}

fn parse_rule_def(reader: &mut Reader) -> Result<RuleDef, BuildError> {
    let name = reader.parse_identifier("expecting <identifier>")?;
    reader.expect(":")?;
    let spec = reader.parse_type_spec()?;

    let mut alts = Vec::new();
    loop {
        reader.expect("=")?;

        let mut rhs = Vec::new();
        reader.skip_trivia();
        while matches!(reader.peek(), Some(b) if b.is_ascii_alphabetic()) {
            let symbol = reader.parse_identifier_raw("expecting <symbol>")?;
            let mark = if reader.try_consume("!") {
                RuleMark::Select
            } else if reader.try_consume("&") {
                RuleMark::Merge
            } else if reader.try_consume(":") {
                RuleMark::Field(reader.parse_identifier("expecting <member>")?)
            } else {
                RuleMark::None
            };
            rhs.push(RuleSymbol { symbol, mark });
            reader.skip_trivia();
        }

        let hint = if reader.try_consume("->") {
            if reader.try_consume("_") {
                Some(QualType { name: String::from("_"), qual: reader.parse_qualifier()? })
            } else {
                Some(reader.parse_type_spec()?)
            }
        } else {
            None
        };

        alts.push(RuleAlt { rhs, hint });

        if reader.try_consume(";") {
            break;
        }
    }

    Ok(RuleDef { name, spec, alts })
}
