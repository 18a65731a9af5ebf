//! uritemplate - URI Template (draft v3) expansion
//!
//! ```
//! use uritemplate::{expand, expand_partial, Params};
//!
//! let template = "http://example.com/users/{user_id}{-prefix|.|format}";
//! let params = Params::new().with("user_id", "dojo");
//! assert_eq!(expand(template, &params).unwrap(), "http://example.com/users/dojo");
//!
//! // Partial expansion keeps what is still unknown as template syntax
//! let staged = expand_partial(template, &params).unwrap();
//! assert_eq!(staged, "http://example.com/users/dojo{-prefix|.|format}");
//! let done = expand(&staged, &Params::new().with("format", "json")).unwrap();
//! assert_eq!(done, "http://example.com/users/dojo.json");
//! ```
//!
//! Default values (`{foo=bar}`) and list values for `-prefix`/`-suffix`
//! are not supported.

pub mod encoding;
pub mod error;
pub mod expander;
pub mod operator;
pub mod package;
pub mod params;
pub mod template;

pub use encoding::{Encoder, PercentEncoder, Verbatim};
pub use error::{FixSuggestion, Result, UriTemplateError};
pub use expander::Expander;
pub use operator::{Expression, Operator};
pub use package::{Package, QueryLink, Resource};
pub use params::{Params, Value};
pub use template::{Lint, Mode, Template, Token};

/// Expand fully with percent-encoding; unresolved expressions become ""
pub fn expand(template: &str, params: &Params) -> Result<String> {
    expand_with(template, params, &PercentEncoder, Mode::Full)
}

/// Expand what `params` resolves, keep the rest as template syntax
pub fn expand_partial(template: &str, params: &Params) -> Result<String> {
    expand_with(template, params, &PercentEncoder, Mode::Partial)
}

pub fn expand_with<E: Encoder + ?Sized>(
    template: &str,
    params: &Params,
    encoder: &E,
    mode: Mode,
) -> Result<String> {
    Template::parse(template)?.expand(params, encoder, mode)
}
