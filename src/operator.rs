//! Expressions and operator evaluation
//!
//! An expression is either a bare variable `{name}` or an operator
//! application `{-operator|arg|var1,var2}`. The operator set is closed, so
//! evaluation is a single match rather than a registry of handlers.
//!
//! In partial mode an expression that cannot be resolved yet is written back
//! as template syntax, narrowed to the variables still missing, such that
//! expanding the result with the remaining parameters gives the same output
//! as expanding the original with all of them.

use std::fmt;
use std::str::FromStr;

use crate::encoding::Encoder;
use crate::error::{Result, UriTemplateError};
use crate::params::{Params, Value};
use crate::template::Mode;

/// Operators usable as `{-name|arg|vars}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `arg` if any variable is present
    Opt,
    /// `arg` if no variable is present
    Neg,
    /// `arg` followed by the value
    Prefix,
    /// The value followed by `arg`
    Suffix,
    /// `name=value` pairs separated by `arg`
    Join,
    /// List items separated by `arg`
    List,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::Opt => "opt",
            Operator::Neg => "neg",
            Operator::Prefix => "prefix",
            Operator::Suffix => "suffix",
            Operator::Join => "join",
            Operator::List => "list",
        }
    }

    /// Prefix, suffix and list take exactly one variable
    pub fn takes_single_variable(self) -> bool {
        matches!(self, Operator::Prefix | Operator::Suffix | Operator::List)
    }
}

impl FromStr for Operator {
    type Err = UriTemplateError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "opt" => Ok(Operator::Opt),
            "neg" => Ok(Operator::Neg),
            "prefix" => Ok(Operator::Prefix),
            "suffix" => Ok(Operator::Suffix),
            "join" => Ok(Operator::Join),
            "list" => Ok(Operator::List),
            _ => Err(UriTemplateError::UnknownOperator {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed `{...}` span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// `{name}`
    Variable(String),
    /// `{-operator|arg|vars}`
    Apply {
        operator: Operator,
        arg: String,
        variables: Vec<String>,
    },
}

impl Expression {
    /// Parse the body of a `{...}` span (braces stripped, never empty)
    pub fn parse(body: &str) -> Result<Self> {
        let Some(rest) = body.strip_prefix('-') else {
            return Ok(Expression::Variable(body.to_string()));
        };

        let parts: Vec<&str> = rest.split('|').collect();
        let [name, arg, operands] = parts.as_slice() else {
            return Err(UriTemplateError::syntax(
                body,
                format!("expected 2 '|' separators, found {}", parts.len() - 1),
            ));
        };

        let operator: Operator = name.parse()?;
        let variables: Vec<String> = operands.split(',').map(str::to_string).collect();

        if variables.iter().any(String::is_empty) {
            return Err(UriTemplateError::syntax(body, "empty variable name"));
        }
        if operator.takes_single_variable() && variables.len() != 1 {
            return Err(UriTemplateError::Arity {
                operator: operator.name().to_string(),
                count: variables.len(),
            });
        }

        Ok(Expression::Apply {
            operator,
            arg: arg.to_string(),
            variables,
        })
    }

    /// Variable names referenced, in template order
    pub fn variables(&self) -> &[String] {
        match self {
            Expression::Variable(name) => std::slice::from_ref(name),
            Expression::Apply { variables, .. } => variables,
        }
    }

    /// Append the expansion of this expression to `out`
    pub fn expand_into<E: Encoder + ?Sized>(
        &self,
        out: &mut String,
        params: &Params,
        encoder: &E,
        mode: Mode,
    ) -> Result<()> {
        let (operator, arg, variables) = match self {
            Expression::Variable(name) => {
                match scalar(params, name)? {
                    Some(value) => out.push_str(&encoder.encode(value)),
                    None if mode.is_partial() => out.push_str(&self.to_string()),
                    None => {}
                }
                return Ok(());
            }
            Expression::Apply {
                operator,
                arg,
                variables,
            } => (*operator, arg.as_str(), variables.as_slice()),
        };

        match operator {
            Operator::Opt => {
                if any_present(params, variables) {
                    out.push_str(arg);
                } else if mode.is_partial() {
                    out.push_str(&self.to_string());
                }
            }
            Operator::Neg => {
                if !any_present(params, variables) {
                    if mode.is_partial() {
                        out.push_str(&self.to_string());
                    } else {
                        out.push_str(arg);
                    }
                }
            }
            Operator::Prefix => match scalar(params, &variables[0])? {
                Some(value) => {
                    out.push_str(arg);
                    out.push_str(&encoder.encode(value));
                }
                None if mode.is_partial() => out.push_str(&self.to_string()),
                None => {}
            },
            Operator::Suffix => match scalar(params, &variables[0])? {
                Some(value) => {
                    out.push_str(&encoder.encode(value));
                    out.push_str(arg);
                }
                None if mode.is_partial() => out.push_str(&self.to_string()),
                None => {}
            },
            Operator::List => match list(params, &variables[0])? {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(arg);
                        }
                        out.push_str(&encoder.encode(item));
                    }
                }
                None if mode.is_partial() => out.push_str(&self.to_string()),
                None => {}
            },
            Operator::Join => {
                if mode.is_partial() {
                    join_partial(out, arg, variables, params, encoder)?;
                } else {
                    join_full(out, arg, variables, params, encoder)?;
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable(name) => write!(f, "{{{}}}", name),
            Expression::Apply {
                operator,
                arg,
                variables,
            } => write!(f, "{{-{}|{}|{}}}", operator, arg, variables.join(",")),
        }
    }
}

/// Lookup for operators that substitute a single value
fn scalar<'p>(params: &'p Params, name: &str) -> Result<Option<&'p str>> {
    match params.get(name) {
        None => Ok(None),
        Some(Value::Scalar(value)) => Ok(Some(value)),
        Some(Value::List(_)) => Err(UriTemplateError::TypeMismatch {
            variable: name.to_string(),
            expected: "a single value, not a list",
        }),
    }
}

/// Lookup for `-list`; an unbound variable yields None, an empty list Some([])
fn list<'p>(params: &'p Params, name: &str) -> Result<Option<&'p [String]>> {
    match params.get(name) {
        None => Ok(None),
        Some(Value::List(items)) => Ok(Some(items)),
        Some(Value::Scalar(_)) => Err(UriTemplateError::TypeMismatch {
            variable: name.to_string(),
            expected: "a list",
        }),
    }
}

fn any_present(params: &Params, variables: &[String]) -> bool {
    variables.iter().any(|name| params.is_present(name))
}

fn push_pair<E: Encoder + ?Sized>(out: &mut String, name: &str, value: &str, encoder: &E) {
    out.push_str(name);
    out.push('=');
    out.push_str(&encoder.encode(value));
}

fn join_full<E: Encoder + ?Sized>(
    out: &mut String,
    separator: &str,
    variables: &[String],
    params: &Params,
    encoder: &E,
) -> Result<()> {
    let mut filled = false;
    for name in variables {
        if let Some(value) = scalar(params, name)? {
            if filled {
                out.push_str(separator);
            }
            push_pair(out, name, value, encoder);
            filled = true;
        }
    }
    Ok(())
}

/// Emit present pairs and re-serialize each run of missing variables so the
/// separators come out right whichever of them turn up later.
fn join_partial<E: Encoder + ?Sized>(
    out: &mut String,
    separator: &str,
    variables: &[String],
    params: &Params,
    encoder: &E,
) -> Result<()> {
    let mut deferred: Vec<&str> = Vec::new();
    let mut filled = false;

    for name in variables {
        match scalar(params, name)? {
            Some(value) => {
                if !deferred.is_empty() {
                    push_deferred(out, separator, &deferred, filled, true);
                    deferred.clear();
                }
                if filled {
                    out.push_str(separator);
                }
                push_pair(out, name, value, encoder);
                filled = true;
            }
            None => deferred.push(name),
        }
    }

    if !deferred.is_empty() {
        push_deferred(out, separator, &deferred, filled, false);
    }
    Ok(())
}

/// `filled`: present pairs were already written before this run.
/// `followed`: a present pair comes right after it.
fn push_deferred(out: &mut String, separator: &str, deferred: &[&str], filled: bool, followed: bool) {
    let names = deferred.join(",");
    match deferred {
        [only] if filled => {
            out.push_str(&format!("{{-prefix|{separator}{only}=|{only}}}"));
        }
        _ if filled => {
            out.push_str(&format!(
                "{{-opt|{separator}|{names}}}{{-join|{separator}|{names}}}"
            ));
        }
        _ if followed => {
            out.push_str(&format!(
                "{{-join|{separator}|{names}}}{{-opt|{separator}|{names}}}"
            ));
        }
        _ => {
            out.push_str(&format!("{{-join|{separator}|{names}}}"));
        }
    }
}
