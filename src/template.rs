//! Template tokenizer
//!
//! A template is split once into literal spans and `{...}` expressions.
//! Braces do not nest: an expression runs from `{` to the next `}`. An
//! empty `{}` and an unterminated `{` stay literal text.
//!
//! Every expression is parsed before any is evaluated, so a malformed
//! expression anywhere fails the whole template.

use std::fmt;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::encoding::Encoder;
use crate::error::Result;
use crate::operator::Expression;
use crate::params::Params;

/// `varname` grammar of the URI Template draft
static VARNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

/// Whether unresolved expressions are dropped or written back as syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Full,
    Partial,
}

impl Mode {
    #[inline]
    pub fn is_partial(self) -> bool {
        self == Mode::Partial
    }
}

impl From<bool> for Mode {
    fn from(partial: bool) -> Self {
        if partial {
            Mode::Partial
        } else {
            Mode::Full
        }
    }
}

/// Token representing a parsed template fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text (stores range in original string)
    Literal(Range<usize>),
    /// `{...}` span, braces included in `span`
    Expression { span: Range<usize>, expression: Expression },
}

/// Variable name outside the draft `varname` grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lint {
    pub variable: String,
    pub span: Range<usize>,
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "variable '{}' at {}..{} is not a standard URI Template name",
            self.variable, self.span.start, self.span.end
        )
    }
}

/// A tokenized template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    tokens: Vec<Token>,
}

impl Template {
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let tokens = tokenize(&source)?;
        Ok(Self { source, tokens })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Expression { expression, .. } => Some(expression),
            Token::Literal(_) => None,
        })
    }

    /// Unique variable names in order of first appearance
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.expressions().flat_map(Expression::variables) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    pub fn lint(&self) -> Vec<Lint> {
        let mut lints = Vec::new();
        for token in &self.tokens {
            if let Token::Expression { span, expression } = token {
                for name in expression.variables() {
                    if !VARNAME_RE.is_match(name) {
                        lints.push(Lint {
                            variable: name.clone(),
                            span: span.clone(),
                        });
                    }
                }
            }
        }
        lints
    }

    /// Literals copied through, expressions evaluated in order
    pub fn expand<E: Encoder + ?Sized>(
        &self,
        params: &Params,
        encoder: &E,
        mode: Mode,
    ) -> Result<String> {
        let mut result = String::with_capacity(self.source.len() + 32);

        for token in &self.tokens {
            match token {
                Token::Literal(range) => result.push_str(&self.source[range.clone()]),
                Token::Expression { expression, .. } => {
                    tracing::trace!(%expression, "evaluating expression");
                    expression.expand_into(&mut result, params, encoder, mode)?;
                }
            }
        }

        Ok(result)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn tokenize(template: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(open) = template[cursor..].find('{').map(|i| cursor + i) {
        let Some(close) = template[open + 1..].find('}').map(|i| open + 1 + i) else {
            break;
        };
        cursor = close + 1;

        let body = &template[open + 1..close];
        if body.is_empty() {
            continue;
        }

        // Flush literal if any
        if open > literal_start {
            tokens.push(Token::Literal(literal_start..open));
        }
        tokens.push(Token::Expression {
            span: open..close + 1,
            expression: Expression::parse(body)?,
        });
        literal_start = close + 1;
    }

    // Flush remaining literal
    if literal_start < template.len() {
        tokens.push(Token::Literal(literal_start..template.len()));
    }

    Ok(tokens)
}
