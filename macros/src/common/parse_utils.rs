//! Common parsing utilities
//!
//! Shared parsing helpers for consistent syntax across macros.

use syn::{
    parse::{Parse, ParseStream},
    Ident, LitInt, Token,
};

// =============================================================================
// Option Parsing: `key = 3`
// =============================================================================

/// A single `key = <integer>` option.
///
/// Used in:
/// - `has_method_form!(Q, max = 3)`
/// - `has_method_form!(Q, arity = 1)`
pub struct IntOption {
    pub key: Ident,
    pub value: LitInt,
}

impl Parse for IntOption {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: LitInt = input.parse()?;
        Ok(IntOption { key, value })
    }
}

impl IntOption {
    /// Parse the value as a count no larger than `limit`.
    pub fn bounded(&self, limit: usize) -> syn::Result<usize> {
        let n = self.value.base10_parse::<usize>()?;
        if n > limit {
            return Err(syn::Error::new(
                self.value.span(),
                format!("`{}` must be at most {}", self.key, limit),
            ));
        }
        Ok(n)
    }
}

/// Parse `, key = N` options after the leading argument.
pub fn parse_trailing_options(input: ParseStream) -> syn::Result<Vec<IntOption>> {
    let mut options = Vec::new();
    while !input.is_empty() {
        input.parse::<Token![,]>()?;
        if input.is_empty() {
            break;
        }
        options.push(input.parse()?);
    }
    Ok(options)
}
