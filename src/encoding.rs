//! Encoding applied to every substituted value

use std::borrow::Cow;

/// Turns a raw parameter value into its substituted form
pub trait Encoder: Send + Sync {
    fn encode<'a>(&self, value: &'a str) -> Cow<'a, str>;
}

/// Percent-encodes everything outside the RFC 3986 unreserved set
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentEncoder;

impl Encoder for PercentEncoder {
    #[inline]
    fn encode<'a>(&self, value: &'a str) -> Cow<'a, str> {
        urlencoding::encode(value)
    }
}

/// Substitutes values unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl Encoder for Verbatim {
    #[inline]
    fn encode<'a>(&self, value: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(value)
    }
}

impl<F> Encoder for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn encode<'a>(&self, value: &'a str) -> Cow<'a, str> {
        Cow::Owned(self(value))
    }
}
