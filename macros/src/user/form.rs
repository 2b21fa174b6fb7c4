//! Shape declaration macros: `method_form!`, `method_signature!`, `form!`,
//! `signature!`.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Ident, Token, Type, Visibility};

use crate::common::{krate, param_list, ShapeSyntax};

/// Which trait a shape implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Fixed prefix plus a variable tail (`MethodForm`)
    Form,
    /// Exact signature (`MethodSignature`)
    Signature,
}

impl ShapeKind {
    fn check_tail(self, shape: &ShapeSyntax) -> syn::Result<()> {
        match (self, &shape.variadic) {
            (ShapeKind::Form, None) => Err(syn::Error::new(
                shape.fn_token.span,
                "a method form needs a trailing `..` for its variable arguments; \
                 use a signature for an exact match",
            )),
            (ShapeKind::Signature, Some(dots)) => Err(syn::Error::new(
                dots.spans[0],
                "a signature cannot have a variable tail; use a method form",
            )),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Named shapes: `pub struct TrainForm = fn(&self, &Matrix, ..);`
// =============================================================================

pub struct NamedShape {
    pub attrs: Vec<Attribute>,
    pub vis: Visibility,
    pub ident: Ident,
    pub shape: ShapeSyntax,
}

impl Parse for NamedShape {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        input.parse::<Token![struct]>()?;
        let ident: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let shape: ShapeSyntax = input.parse()?;
        input.parse::<Token![;]>()?;
        Ok(NamedShape { attrs, vis, ident, shape })
    }
}

pub struct NamedShapes(pub Vec<NamedShape>);

impl Parse for NamedShapes {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut shapes = Vec::new();
        while !input.is_empty() {
            shapes.push(input.parse()?);
        }
        Ok(NamedShapes(shapes))
    }
}

pub fn expand_named_shapes(input: NamedShapes, kind: ShapeKind) -> syn::Result<TokenStream> {
    let mut out = TokenStream::new();
    for named in &input.0 {
        out.extend(expand_named_shape(named, kind)?);
    }
    Ok(out)
}

fn expand_named_shape(named: &NamedShape, kind: ShapeKind) -> syn::Result<TokenStream> {
    kind.check_tail(&named.shape)?;

    let class = Ident::new("__Class", Span::call_site());
    let erased = named.shape.erase(Some(syn::parse_quote! { #class }))?;

    let k = krate();
    let NamedShape { attrs, vis, ident, .. } = named;
    let receiver = erased.receiver.to_type();
    let list = param_list(&erased.params);
    let output = &erased.output;

    let body = match kind {
        ShapeKind::Form => quote! {
            impl<#class: ?Sized> #k::MethodForm<#class> for #ident {
                type Receiver = #receiver;
                type Prefix = #list;
                type Output = #output;
            }
        },
        ShapeKind::Signature => quote! {
            impl<#class: ?Sized> #k::MethodSignature<#class> for #ident {
                type Receiver = #receiver;
                type Args = #list;
                type Output = #output;
            }
        },
    };

    Ok(quote! {
        #(#attrs)*
        #vis struct #ident;

        #body
    })
}

// =============================================================================
// Inline shapes: `form!(fn(&self, ..) -> f64)`
// =============================================================================

pub fn expand_inline_shape(shape: ShapeSyntax, kind: ShapeKind) -> syn::Result<TokenStream> {
    kind.check_tail(&shape)?;

    let erased = shape.erase(None)?;
    if erased.saw_self {
        return Err(syn::Error::new(
            shape.fn_token.span,
            "`Self` cannot appear in an inline shape; declare it with `method_form!` or \
             `method_signature!` instead",
        ));
    }

    let k = krate();
    let receiver = erased.receiver.to_type();
    let list = param_list(&erased.params);
    let output: &Type = &erased.output;

    Ok(match kind {
        ShapeKind::Form => quote! { #k::Form<#receiver, #list, #output> },
        ShapeKind::Signature => quote! { #k::Signature<#receiver, #list, #output> },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_requires_tail() {
        let shape: ShapeSyntax = syn::parse_str("fn(&self, i32)").unwrap();
        assert!(expand_inline_shape(shape, ShapeKind::Form).is_err());
    }

    #[test]
    fn test_signature_rejects_tail() {
        let shape: ShapeSyntax = syn::parse_str("fn(&self, ..)").unwrap();
        assert!(expand_inline_shape(shape, ShapeKind::Signature).is_err());
    }

    #[test]
    fn test_inline_rejects_self() {
        let shape: ShapeSyntax = syn::parse_str("fn(&self) -> Self").unwrap();
        assert!(expand_inline_shape(shape, ShapeKind::Signature).is_err());
    }

    #[test]
    fn test_named_substitutes_self() {
        let input: NamedShapes =
            syn::parse_str("pub struct CloneSig = fn(&self) -> Self;").unwrap();
        let out = expand_named_shapes(input, ShapeKind::Signature).unwrap().to_string();
        assert!(out.contains("type Output = __Class"));
        assert!(!out.contains("Self"));
    }

    #[test]
    fn test_inline_form() {
        let shape: ShapeSyntax = syn::parse_str("fn(&mut self, &[f64], ..) -> f64").unwrap();
        let out = expand_inline_shape(shape, ShapeKind::Form).unwrap().to_string().replace(' ', "");
        assert_eq!(
            out,
            "::method_probe::Form<::method_probe::Mut,\
             ::method_probe::Cons<::method_probe::Shared<[f64]>,::method_probe::Nil>,f64>"
        );
    }
}
