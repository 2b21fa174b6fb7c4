//! Peano number generation.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, Ident, LitInt};

use crate::common::krate;

pub struct PeanoInput {
    pub max: usize,
}

impl Parse for PeanoInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lit: LitInt = input.parse()?;
        let max = lit.base10_parse::<usize>()?;
        Ok(PeanoInput { max })
    }
}

/// Largest alias emitted by `peano!` in the runtime crate.
pub const MAX_ALIAS: usize = 64;

pub fn expand_peano(input: PeanoInput) -> TokenStream {
    let max = input.max;

    // D0 = Z
    let mut types = vec![quote! {
        #[doc = "Arity 0"]
        pub type D0 = Z;
    }];

    // D1..Dmax = S<D(n-1)>
    for n in 1..=max {
        let curr = alias_ident(n);
        let prev = alias_ident(n - 1);
        let doc = format!("Arity {}", n);
        types.push(quote! {
            #[doc = #doc]
            pub type #curr = S<#prev>;
        });
    }

    quote! { #(#types)* }
}

fn alias_ident(n: usize) -> Ident {
    Ident::new(&format!("D{}", n), Span::call_site())
}

/// Type for arity `n` in generated code: an alias when one exists,
/// nested successors otherwise.
pub fn peano_type(n: usize) -> TokenStream {
    let k = krate();
    if n <= MAX_ALIAS {
        let alias = alias_ident(n);
        return quote! { #k::primitives::#alias };
    }
    (0..n).fold(quote! { #k::Z }, |inner, _| quote! { #k::S<#inner> })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peano_type() {
        assert_eq!(peano_type(3).to_string().replace(' ', ""), "::method_probe::primitives::D3");
        let deep = peano_type(MAX_ALIAS + 2).to_string().replace(' ', "");
        assert!(deep.starts_with("::method_probe::S<::method_probe::S<"));
        assert_eq!(deep.matches("S<").count(), MAX_ALIAS + 2);
    }
}
