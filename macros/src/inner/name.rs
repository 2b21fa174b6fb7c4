//! Method name to type-level identity.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{Ident, LitChar, LitStr};

use crate::common::krate;

pub struct NameInput {
    pub name: String,
    pub span: Span,
}

impl Parse for NameInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            let lit: LitStr = input.parse()?;
            let name = lit.value();
            if name.is_empty() {
                return Err(syn::Error::new(lit.span(), "method name must not be empty"));
            }
            return Ok(NameInput { name, span: lit.span() });
        }
        // `Ident::parse_any` accepts keywords and strips `r#`
        let ident = Ident::parse_any(input)?;
        Ok(NameInput { name: ident.unraw().to_string(), span: ident.span() })
    }
}

pub fn expand_name(input: NameInput) -> TokenStream {
    name_type(&input.name, input.span)
}

/// `Name<(Ch<'a'>, Ch<'b'>, ...)>` for `name`.
pub fn name_type(name: &str, span: Span) -> TokenStream {
    let k = krate();
    let chars = name.chars().map(|c| {
        let lit = LitChar::new(c, span);
        quote! { #k::Ch<#lit> }
    });
    quote! { #k::Name<(#(#chars,)*)> }
}
