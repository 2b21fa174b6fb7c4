//! `#[methods]`: register the members of an impl block.
//!
//! For every eligible associated fn the attribute emits
//!
//! ```text
//! impl<..> Method<name!(fn_name), D{arity}> for SelfTy where .. {
//!     type Receiver = ..;
//!     type Args = Cons<..>;
//!     type Output = ..;
//! }
//! ```
//!
//! A fn is skipped when it cannot be described by a plain signature: type or
//! const generics, `impl Trait` arguments or output, `async`, C variadics,
//! and typed receivers other than `Self`, `&Self` and `&mut Self`.
//!
//! `Self::Assoc` in a trait impl is registered as `<SelfTy as Trait>::Assoc`;
//! an inherent impl cannot name it, so such fns are skipped there. The fn's
//! own `where` clause joins the emitted impl's, unless it mentions the fn's
//! lifetime parameters or `Self::Assoc`, in which case the fn is skipped.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::visit_mut::{self, VisitMut};
use syn::{
    Attribute, FnArg, GenericParam, Ident, ImplItem, ImplItemFn, Item, ItemImpl, Lifetime,
    LitStr, Path, Receiver, ReturnType, Signature, Type, TypePath, WherePredicate,
};

use crate::common::{krate, param_list, ReceiverSyntax, TypeEraser};
use crate::inner::name::name_type;
use crate::inner::peano::peano_type;

const HELPER_ATTR: &str = "method";

/// Options from `#[method(...)]` on a single fn.
#[derive(Default)]
struct MethodOptions {
    skip: bool,
    rename: Option<LitStr>,
}

fn take_options(attrs: &mut Vec<Attribute>) -> syn::Result<MethodOptions> {
    let mut options = MethodOptions::default();
    let mut result = Ok(());
    attrs.retain(|attr| {
        if !attr.path().is_ident(HELPER_ATTR) {
            return true;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                if name.value().is_empty() {
                    return Err(meta.error("method name must not be empty"));
                }
                options.rename = Some(name);
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"...\"`"))
            }
        });
        if let Err(err) = parsed {
            if result.is_ok() {
                result = Err(err);
            }
        }
        false
    });
    result.map(|()| options)
}

/// One member described for registration.
struct Registration {
    name: String,
    name_span: proc_macro2::Span,
    receiver: ReceiverSyntax,
    args: Vec<Type>,
    output: Type,
    predicates: Vec<WherePredicate>,
}

fn classify_receiver(receiver: &Receiver) -> Option<ReceiverSyntax> {
    if receiver.colon_token.is_none() {
        return Some(match (&receiver.reference, &receiver.mutability) {
            (Some(_), Some(_)) => ReceiverSyntax::Mut,
            (Some(_), None) => ReceiverSyntax::Ref,
            (None, _) => ReceiverSyntax::Value,
        });
    }
    // `self: T`
    match receiver.ty.as_ref() {
        Type::Path(path) if path.qself.is_none() && path.path.is_ident("Self") => {
            Some(ReceiverSyntax::Value)
        }
        Type::Reference(reference) => match reference.elem.as_ref() {
            Type::Path(path) if path.qself.is_none() && path.path.is_ident("Self") => {
                Some(if reference.mutability.is_some() {
                    ReceiverSyntax::Mut
                } else {
                    ReceiverSyntax::Ref
                })
            }
            _ => None,
        },
        _ => None,
    }
}

fn is_plain(sig: &Signature) -> bool {
    let generic = sig
        .generics
        .params
        .iter()
        .any(|param| !matches!(param, GenericParam::Lifetime(_)));
    !generic && sig.asyncness.is_none() && sig.variadic.is_none()
}

/// Finds names that only exist inside the fn or inside the user's trait.
struct LocalNames<'a> {
    lifetimes: &'a [Ident],
    found: bool,
}

impl VisitMut for LocalNames<'_> {
    fn visit_lifetime_mut(&mut self, lifetime: &mut Lifetime) {
        if self.lifetimes.contains(&lifetime.ident) {
            self.found = true;
        }
    }

    fn visit_type_path_mut(&mut self, path: &mut TypePath) {
        if path.qself.is_none()
            && path.path.leading_colon.is_none()
            && path.path.segments.len() > 1
            && path.path.segments[0].ident == "Self"
        {
            self.found = true;
        }
        visit_mut::visit_type_path_mut(self, path);
    }
}

/// Predicates of the fn's `where` clause, or `None` if they cannot be moved
/// onto the registration impl.
fn carried_predicates(sig: &Signature) -> Option<Vec<WherePredicate>> {
    let Some(where_clause) = &sig.generics.where_clause else {
        return Some(Vec::new());
    };
    let lifetimes: Vec<Ident> =
        sig.generics.lifetimes().map(|param| param.lifetime.ident.clone()).collect();
    let mut predicates = Vec::with_capacity(where_clause.predicates.len());
    for predicate in &where_clause.predicates {
        let mut predicate = predicate.clone();
        let mut finder = LocalNames { lifetimes: &lifetimes, found: false };
        finder.visit_where_predicate_mut(&mut predicate);
        if finder.found {
            return None;
        }
        predicates.push(predicate);
    }
    Some(predicates)
}

fn describe(
    func: &ImplItemFn,
    options: &MethodOptions,
    self_ty: &Type,
    trait_path: Option<&Path>,
) -> Option<Registration> {
    let sig = &func.sig;
    if options.skip || !is_plain(sig) {
        return None;
    }

    let receiver = match sig.receiver() {
        Some(receiver) => classify_receiver(receiver)?,
        None => ReceiverSyntax::Static,
    };

    let predicates = carried_predicates(sig)?;

    let mut eraser = TypeEraser::for_impl(self_ty, trait_path);
    let mut args = Vec::new();
    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            args.push(eraser.erase(&pat_type.ty));
        }
    }
    let output = match &sig.output {
        ReturnType::Default => syn::parse_quote! { () },
        ReturnType::Type(_, ty) => eraser.erase(ty),
    };
    if eraser.unnameable.is_some() {
        return None;
    }

    let (name, name_span) = match &options.rename {
        Some(lit) => (lit.value(), lit.span()),
        None => (sig.ident.unraw().to_string(), sig.ident.span()),
    };

    Some(Registration { name, name_span, receiver, args, output, predicates })
}

fn registration_impl(item: &ItemImpl, reg: &Registration) -> TokenStream {
    let k = krate();
    let mut generics = item.generics.clone();
    if !reg.predicates.is_empty() {
        generics.make_where_clause().predicates.extend(reg.predicates.iter().cloned());
    }
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let self_ty = &item.self_ty;

    let name = name_type(&reg.name, reg.name_span);
    let arity = peano_type(reg.args.len());
    let receiver = reg.receiver.to_type();
    let args = param_list(&reg.args);
    let output = &reg.output;

    quote! {
        impl #impl_generics #k::Method<#name, #arity> for #self_ty #where_clause {
            type Receiver = #receiver;
            type Args = #args;
            type Output = #output;
        }
    }
}

pub fn expand_methods(attr: TokenStream, item: Item) -> syn::Result<TokenStream> {
    if !attr.is_empty() {
        return Err(syn::Error::new_spanned(attr, "`#[methods]` takes no arguments"));
    }

    let mut item_impl = match item {
        Item::Impl(item_impl) => item_impl,
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "`#[methods]` can only be applied to an impl block",
            ));
        }
    };

    let self_ty = (*item_impl.self_ty).clone();
    let trait_path = item_impl.trait_.as_ref().map(|(_, path, _)| path.clone());

    let mut registrations = Vec::new();
    for impl_item in &mut item_impl.items {
        if let ImplItem::Fn(func) = impl_item {
            let options = take_options(&mut func.attrs)?;
            if let Some(reg) = describe(func, &options, &self_ty, trait_path.as_ref()) {
                registrations.push(reg);
            }
        }
    }

    let impls = registrations.iter().map(|reg| registration_impl(&item_impl, reg));

    Ok(quote! {
        #item_impl

        #(#impls)*
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(src: &str) -> String {
        let item: Item = syn::parse_str(src).unwrap();
        expand_methods(TokenStream::new(), item).unwrap().to_string().replace(' ', "")
    }

    #[test]
    fn test_registers_each_fn() {
        let out = expand(
            "impl Quadratic {
                fn evaluate(&self, x: &[f64]) -> f64 { 0.0 }
                fn reset(&mut self) {}
                fn new() -> Self { Quadratic }
            }",
        );
        assert_eq!(out.matches("::method_probe::Method<").count(), 3);
        assert!(out.contains("typeReceiver=::method_probe::Ref;"));
        assert!(out.contains("typeReceiver=::method_probe::Mut;"));
        assert!(out.contains("typeReceiver=::method_probe::Static;"));
        assert!(out.contains("typeOutput=Self;"));
    }

    #[test]
    fn test_skips_generic_and_opaque() {
        let out = expand(
            "impl Quadratic {
                fn scaled<T: Into<f64>>(&self, by: T) -> f64 { 0.0 }
                fn points(&self) -> impl Iterator<Item = f64> { None.into_iter() }
                async fn fetch(&self) -> f64 { 0.0 }
                fn boxed(self: Box<Self>) {}
                #[method(skip)]
                fn hidden(&self) {}
            }",
        );
        assert_eq!(out.matches("::method_probe::Method<").count(), 0);
        assert!(!out.contains("#[method"));
    }

    #[test]
    fn test_rename() {
        let renamed = expand(
            "impl Quadratic {
                #[method(rename = \"evaluate\")]
                fn evaluate_batch(&self, x: &[f64], begin: usize) -> f64 { 0.0 }
            }",
        );
        let plain = expand("impl Quadratic { fn evaluate(&self, x: &[f64], begin: usize) -> f64 { 0.0 } }");
        let tail = |s: &str| s[s.find("impl::method_probe::Method").unwrap()..].to_string();
        assert_eq!(tail(&renamed), tail(&plain));
    }

    #[test]
    fn test_generic_impl_keeps_bounds() {
        let out = expand(
            "impl<T: Clone> Wrapper<T> where T: Default {
                fn get(&self) -> T { T::default() }
            }",
        );
        assert!(out.contains("impl<T:Clone>::method_probe::Method<"));
        assert!(out.contains("forWrapper<T>whereT:Default"));
    }

    #[test]
    fn test_trait_impl_qualifies_assoc_types() {
        let out = expand(
            "impl Iterator for Counter {
                type Item = u32;
                fn next(&mut self) -> Option<Self::Item> { None }
            }",
        );
        assert_eq!(out.matches("::method_probe::Method<").count(), 1);
        assert!(out.contains("typeOutput=Option<<CounterasIterator>::Item>;"));
    }

    #[test]
    fn test_inherent_impl_skips_assoc_types() {
        let out = expand(
            "impl Counter {
                fn peek(&self) -> Option<Self::Item> { None }
                fn reset(&mut self) {}
            }",
        );
        assert_eq!(out.matches("::method_probe::Method<").count(), 1);
    }

    #[test]
    fn test_fn_where_clause_is_carried() {
        let out = expand(
            "impl<T> Holder<T> {
                fn dup(&self) -> (T, T) where T: Clone { todo!() }
            }",
        );
        assert!(out.contains("forHolder<T>whereT:Clone"));
    }

    #[test]
    fn test_fn_where_clause_with_local_names_is_skipped() {
        let out = expand(
            "impl<T> Holder<T> {
                fn borrow_as<'b>(&'b self) -> &'b T where T: 'b { &self.0 }
                fn first(&self) -> u8 where Self::Item: Copy { 0 }
            }",
        );
        assert_eq!(out.matches("::method_probe::Method<").count(), 0);
    }

    #[test]
    fn test_rejects_non_impl() {
        let item: Item = syn::parse_str("struct NotAnImpl;").unwrap();
        assert!(expand_methods(TokenStream::new(), item).is_err());
    }

    #[test]
    fn test_rejects_unknown_option() {
        let item: Item =
            syn::parse_str("impl A { #[method(unknown)] fn f(&self) {} }").unwrap();
        assert!(expand_methods(TokenStream::new(), item).is_err());
    }
}
