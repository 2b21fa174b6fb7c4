//! Arity probes: `has_method_form!` and `method_form_arity!`.
//!
//! ```text
//! has_method_form!(HasTrain<TrainForm, A>)            any arity in 0..=7
//! has_method_form!(HasTrain<TrainForm, A>, max = 3)   any arity in 0..=3
//! has_method_form!(HasTrain<TrainForm, A>, arity = 2) exactly 2
//! method_form_arity!(HasTrain<TrainForm, A>)          Option<usize>
//! ```

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::Type;

use crate::common::{krate, parse_trailing_options};
use crate::inner::peano::peano_type;

/// Default search bound; mirrors `method_probe::MAX_ADDITIONAL_ARGS`.
pub const DEFAULT_MAX: usize = 7;

/// Largest bound or arity a query may request; mirrors
/// `method_probe::detect::MAX_PROBE_BOUND`.
pub const PROBE_LIMIT: usize = 64;

/// Which arities to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRange {
    /// `0..=max`
    UpTo(usize),
    /// Exactly one arity
    Exactly(usize),
}

pub struct ProbeInput {
    pub query: Type,
    pub range: ProbeRange,
}

impl Parse for ProbeInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let query: Type = input.parse()?;
        let mut range = None;
        for option in parse_trailing_options(input)? {
            let next = if option.key == "max" {
                ProbeRange::UpTo(option.bounded(PROBE_LIMIT)?)
            } else if option.key == "arity" {
                ProbeRange::Exactly(option.bounded(PROBE_LIMIT)?)
            } else {
                return Err(syn::Error::new(option.key.span(), "expected `max = N` or `arity = N`"));
            };
            if range.replace(next).is_some() {
                return Err(syn::Error::new(
                    option.key.span(),
                    "give at most one of `max` and `arity`",
                ));
            }
        }
        Ok(ProbeInput { query, range: range.unwrap_or(ProbeRange::UpTo(DEFAULT_MAX)) })
    }
}

fn probe(query: &Type, arity: usize) -> TokenStream {
    let k = krate();
    let n = peano_type(arity);
    quote! { #k::detect::Probe::<#query, #n>::MATCHES }
}

fn probe_array(query: &Type, max: usize) -> TokenStream {
    let probes = (0..=max).map(|arity| probe(query, arity));
    quote! { [#(#probes),*] }
}

/// `bool` expression for `has_method_form!`.
pub fn expand_has_method_form(input: ProbeInput) -> TokenStream {
    let k = krate();
    let body = match input.range {
        ProbeRange::Exactly(arity) => probe(&input.query, arity),
        ProbeRange::UpTo(max) => {
            let probes = probe_array(&input.query, max);
            quote! { #k::detect::any_match(&#probes) }
        }
    };
    quote! {
        {
            #[allow(unused_imports)]
            use #k::detect::ProbeFallback as _;
            #body
        }
    }
}

/// `Option<usize>` expression for `method_form_arity!`.
pub fn expand_method_form_arity(input: ProbeInput) -> syn::Result<TokenStream> {
    let max = match input.range {
        ProbeRange::UpTo(max) => max,
        ProbeRange::Exactly(_) => {
            return Err(syn::Error::new_spanned(
                &input.query,
                "`method_form_arity!` searches a range; use `max = N`, not `arity = N`",
            ));
        }
    };
    let k = krate();
    let probes = probe_array(&input.query, max);
    Ok(quote! {
        {
            #[allow(unused_imports)]
            use #k::detect::ProbeFallback as _;
            #k::detect::first_match(&#probes)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> syn::Result<ProbeInput> {
        syn::parse_str(src)
    }

    #[test]
    fn test_default_range() {
        assert_eq!(parse("HasTrain<TrainForm, A>").unwrap().range, ProbeRange::UpTo(DEFAULT_MAX));
        assert_eq!(parse("HasTrain<TrainForm, A>,").unwrap().range, ProbeRange::UpTo(DEFAULT_MAX));
    }

    #[test]
    fn test_options() {
        assert_eq!(parse("Q, max = 3").unwrap().range, ProbeRange::UpTo(3));
        assert_eq!(parse("Q, arity = 0").unwrap().range, ProbeRange::Exactly(0));
        assert!(parse("Q, max = 65").is_err());
        assert!(parse("Q, max = 2, arity = 1").is_err());
        assert!(parse("Q, depth = 2").is_err());
    }

    #[test]
    fn test_probe_count() {
        let out = expand_has_method_form(parse("Q, max = 3").unwrap()).to_string();
        assert_eq!(out.matches("MATCHES").count(), 4);

        let out = expand_has_method_form(parse("Q").unwrap()).to_string();
        assert_eq!(out.matches("MATCHES").count(), DEFAULT_MAX + 1);

        let out = expand_has_method_form(parse("Q, arity = 5").unwrap()).to_string();
        assert_eq!(out.matches("MATCHES").count(), 1);
        assert!(out.replace(' ', "").contains("::method_probe::primitives::D5>"));
    }

    #[test]
    fn test_arity_rejects_fixed() {
        assert!(expand_method_form_arity(parse("Q, arity = 1").unwrap()).is_err());
    }
}
