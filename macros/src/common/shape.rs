//! Signature shape syntax shared by the shape macros.
//!
//! ```text
//! fn(&self, &Matrix, labels: &[usize], ..) -> f64
//!    ^^^^^  ^^^^^^^^^^^^^^^^^^^^^^^^^^  ^^    ^^^
//!    receiver   fixed parameters       tail  output
//! ```

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::discouraged::Speculative;
use syn::parse::{Parse, ParseStream};
use syn::{parenthesized, parse_quote, Ident, Lifetime, ReturnType, Token, Type};

use super::erase::TypeEraser;
use super::krate;

/// How a shape or method takes its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverSyntax {
    Ref,
    Mut,
    Value,
    Static,
}

impl ReceiverSyntax {
    pub fn to_type(self) -> TokenStream {
        let k = krate();
        match self {
            ReceiverSyntax::Ref => quote! { #k::Ref },
            ReceiverSyntax::Mut => quote! { #k::Mut },
            ReceiverSyntax::Value => quote! { #k::Value },
            ReceiverSyntax::Static => quote! { #k::Static },
        }
    }
}

/// A parsed `fn(...) -> T` shape.
pub struct ShapeSyntax {
    pub fn_token: Token![fn],
    pub receiver: ReceiverSyntax,
    pub params: Vec<Type>,
    pub variadic: Option<Token![..]>,
    pub output: Type,
}

impl Parse for ShapeSyntax {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let fn_token: Token![fn] = input.parse()?;
        let content;
        parenthesized!(content in input);

        let receiver = parse_receiver(&content)?;
        if receiver != ReceiverSyntax::Static && !content.is_empty() {
            content.parse::<Token![,]>()?;
        }

        let mut params = Vec::new();
        let mut variadic = None;
        while !content.is_empty() {
            if content.peek(Token![..]) {
                let dots: Token![..] = content.parse()?;
                if !content.is_empty() {
                    content.parse::<Token![,]>()?;
                }
                if !content.is_empty() {
                    return Err(syn::Error::new(dots.spans[0], "`..` must be the last parameter"));
                }
                variadic = Some(dots);
                break;
            }

            skip_param_name(&content)?;
            params.push(content.parse::<Type>()?);

            if content.is_empty() {
                break;
            }
            content.parse::<Token![,]>()?;
        }

        let output = match input.parse::<ReturnType>()? {
            ReturnType::Default => parse_quote! { () },
            ReturnType::Type(_, ty) => *ty,
        };

        Ok(ShapeSyntax { fn_token, receiver, params, variadic, output })
    }
}

/// Consume `&self`, `&'a mut self`, `self` or `mut self` if present.
fn parse_receiver(input: ParseStream) -> syn::Result<ReceiverSyntax> {
    if input.peek(Token![self]) {
        input.parse::<Token![self]>()?;
        return Ok(ReceiverSyntax::Value);
    }
    if input.peek(Token![mut]) && input.peek2(Token![self]) {
        input.parse::<Token![mut]>()?;
        input.parse::<Token![self]>()?;
        return Ok(ReceiverSyntax::Value);
    }
    if input.peek(Token![&]) {
        let fork = input.fork();
        fork.parse::<Token![&]>()?;
        if fork.peek(Lifetime) {
            fork.parse::<Lifetime>()?;
        }
        let mutability: Option<Token![mut]> = fork.parse()?;
        if fork.peek(Token![self]) {
            fork.parse::<Token![self]>()?;
            input.advance_to(&fork);
            return Ok(if mutability.is_some() { ReceiverSyntax::Mut } else { ReceiverSyntax::Ref });
        }
    }
    Ok(ReceiverSyntax::Static)
}

/// Parameters may be written `name: Type` or `mut name: Type`; the binding
/// is dropped.
fn skip_param_name(input: ParseStream) -> syn::Result<()> {
    // No type starts with `mut`
    if input.peek(Token![mut]) {
        input.parse::<Token![mut]>()?;
        input.parse::<Ident>()?;
        input.parse::<Token![:]>()?;
        return Ok(());
    }
    let named = (input.peek(Ident) || input.peek(Token![_]))
        && input.peek2(Token![:])
        && !input.peek2(Token![::]);
    if named {
        if input.peek(Token![_]) {
            input.parse::<Token![_]>()?;
        } else {
            input.parse::<Ident>()?;
        }
        input.parse::<Token![:]>()?;
    }
    Ok(())
}

/// Erased parameter and output types of a shape.
pub struct ErasedShape {
    pub receiver: ReceiverSyntax,
    pub params: Vec<Type>,
    pub output: Type,
    pub saw_self: bool,
}

impl ShapeSyntax {
    /// Erase every type, substituting `Self` when `self_subst` is given.
    pub fn erase(&self, self_subst: Option<Type>) -> syn::Result<ErasedShape> {
        let mut eraser = match self_subst {
            Some(subst) => TypeEraser::substituting_self(subst),
            None => TypeEraser::new(),
        };
        let mut params = Vec::with_capacity(self.params.len());
        for param in &self.params {
            params.push(eraser.erase(param));
            if let Some(reason) = eraser.unnameable.take() {
                return Err(syn::Error::new_spanned(param, reason.describe()));
            }
        }
        let output = eraser.erase(&self.output);
        if let Some(reason) = eraser.unnameable.take() {
            return Err(syn::Error::new_spanned(&self.output, reason.describe()));
        }
        Ok(ErasedShape { receiver: self.receiver, params, output, saw_self: eraser.saw_self })
    }
}

/// Build `Cons<A, Cons<B, Nil>>` from argument types.
pub fn param_list(params: &[Type]) -> TokenStream {
    let k = krate();
    params.iter().rev().fold(quote! { #k::Nil }, |tail, head| quote! { #k::Cons<#head, #tail> })
}
