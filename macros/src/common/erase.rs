//! Lifetime erasure for signature types.
//!
//! Registrations and shapes are compared by type identity, so both sides are
//! rewritten the same way before they are emitted:
//!
//! - `&T` / `&mut T` become `Shared<T>` / `Exclusive<T>`
//! - every other lifetime becomes `'static` (binders excepted)
//! - `!` becomes `Never`
//! - `Self` is optionally substituted with a type parameter
//! - `Self::Assoc` is qualified as `<SelfTy as Trait>::Assoc` inside trait
//!   impls and rejected elsewhere

use proc_macro2::Span;
use syn::visit_mut::{self, VisitMut};
use syn::{parse_quote, BoundLifetimes, Lifetime, Path, Type};

use super::krate;

/// Why a type cannot take part in a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unnameable {
    /// `impl Trait`
    ImplTrait,
    /// `_`
    Infer,
    /// `Self::Assoc` outside a trait impl
    SelfProjection,
}

impl Unnameable {
    pub fn describe(self) -> &'static str {
        match self {
            Unnameable::ImplTrait => "`impl Trait` types cannot be named in a signature",
            Unnameable::Infer => "`_` types cannot be named in a signature",
            Unnameable::SelfProjection => {
                "associated types of `Self` are not supported in a shape; name the type directly"
            }
        }
    }
}

pub struct TypeEraser {
    self_subst: Option<Type>,
    /// `(SelfTy, Trait)` of the enclosing trait impl
    self_trait: Option<(Type, Path)>,
    reject_projection: bool,
    /// Set when a bare `Self` was seen
    pub saw_self: bool,
    pub unnameable: Option<Unnameable>,
}

impl Default for TypeEraser {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeEraser {
    /// Keep `Self` as written.
    pub fn new() -> Self {
        TypeEraser {
            self_subst: None,
            self_trait: None,
            reject_projection: false,
            saw_self: false,
            unnameable: None,
        }
    }

    /// Replace `Self` with `subst`.
    pub fn substituting_self(subst: Type) -> Self {
        TypeEraser { self_subst: Some(subst), reject_projection: true, ..Self::new() }
    }

    /// Erase the signature of a member of `impl [Trait for] SelfTy`.
    ///
    /// `Self` stays as written. `Self::Assoc` is qualified with the trait,
    /// or rejected in an inherent impl.
    pub fn for_impl(self_ty: &Type, trait_path: Option<&Path>) -> Self {
        match trait_path {
            Some(path) => TypeEraser {
                self_trait: Some((self_ty.clone(), path.clone())),
                ..Self::new()
            },
            None => TypeEraser { reject_projection: true, ..Self::new() },
        }
    }

    pub fn erase(&mut self, ty: &Type) -> Type {
        let mut ty = ty.clone();
        self.visit_type_mut(&mut ty);
        ty
    }

    fn flag(&mut self, reason: Unnameable) {
        self.unnameable.get_or_insert(reason);
    }
}

fn is_bare_self(path: &syn::TypePath) -> bool {
    path.qself.is_none() && path.path.is_ident("Self")
}

fn starts_with_self(path: &syn::TypePath) -> bool {
    path.qself.is_none()
        && path.path.leading_colon.is_none()
        && path.path.segments.len() > 1
        && path.path.segments[0].ident == "Self"
}

impl VisitMut for TypeEraser {
    fn visit_type_mut(&mut self, ty: &mut Type) {
        match ty {
            Type::Reference(reference) => {
                self.visit_type_mut(&mut reference.elem);
                let elem = &reference.elem;
                let k = krate();
                *ty = if reference.mutability.is_some() {
                    parse_quote! { #k::Exclusive<#elem> }
                } else {
                    parse_quote! { #k::Shared<#elem> }
                };
            }
            Type::Never(_) => {
                let k = krate();
                *ty = parse_quote! { #k::Never };
            }
            Type::ImplTrait(_) => self.flag(Unnameable::ImplTrait),
            Type::Infer(_) => self.flag(Unnameable::Infer),
            Type::Path(path) if is_bare_self(path) => {
                self.saw_self = true;
                if let Some(subst) = &self.self_subst {
                    *ty = subst.clone();
                }
            }
            Type::Path(path) if starts_with_self(path) => {
                self.saw_self = true;
                if self.reject_projection {
                    self.flag(Unnameable::SelfProjection);
                }
                visit_mut::visit_type_mut(self, ty);
                if let (Type::Path(path), Some((self_ty, trait_path))) = (&*ty, &self.self_trait) {
                    let mut assoc = path.path.clone();
                    assoc.segments = path.path.segments.iter().skip(1).cloned().collect();
                    let qualified: Type = parse_quote! { <#self_ty as #trait_path>::#assoc };
                    *ty = qualified;
                }
            }
            _ => visit_mut::visit_type_mut(self, ty),
        }
    }

    fn visit_lifetime_mut(&mut self, lifetime: &mut Lifetime) {
        *lifetime = Lifetime::new("'static", Span::call_site());
    }

    // `for<'a>` binders stay as written
    fn visit_bound_lifetimes_mut(&mut self, _: &mut BoundLifetimes) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;

    fn erased(src: &str) -> String {
        let ty: Type = syn::parse_str(src).unwrap();
        TypeEraser::new().erase(&ty).to_token_stream().to_string().replace(' ', "")
    }

    #[test]
    fn test_references() {
        assert_eq!(erased("&[f64]"), "::method_probe::Shared<[f64]>");
        assert_eq!(erased("&'a mut Vec<f64>"), "::method_probe::Exclusive<Vec<f64>>");
        assert_eq!(erased("&&str"), "::method_probe::Shared<::method_probe::Shared<str>>");
    }

    #[test]
    fn test_lifetimes() {
        assert_eq!(erased("Formatter<'_>"), "Formatter<'static>");
        assert_eq!(erased("Box<dyn Fn(&str) + 'a>"), "Box<dynFn(::method_probe::Shared<str>)+'static>");
        assert_eq!(erased("for<'a> fn(&'a str)"), "for<'a>fn(::method_probe::Shared<str>)");
    }

    #[test]
    fn test_never_and_unnameable() {
        assert_eq!(erased("!"), "::method_probe::Never");

        let mut eraser = TypeEraser::new();
        eraser.erase(&syn::parse_str("impl Iterator<Item = u8>").unwrap());
        assert_eq!(eraser.unnameable, Some(Unnameable::ImplTrait));
    }

    #[test]
    fn test_self_substitution() {
        let mut eraser = TypeEraser::substituting_self(syn::parse_str("__C").unwrap());
        let ty = eraser.erase(&syn::parse_str("&Self").unwrap());
        assert!(eraser.saw_self);
        assert_eq!(ty.to_token_stream().to_string().replace(' ', ""), "::method_probe::Shared<__C>");

        let mut eraser = TypeEraser::substituting_self(syn::parse_str("__C").unwrap());
        eraser.erase(&syn::parse_str("Self::Item").unwrap());
        assert_eq!(eraser.unnameable, Some(Unnameable::SelfProjection));

        let mut eraser = TypeEraser::new();
        let ty = eraser.erase(&syn::parse_str("Option<Self>").unwrap());
        assert!(eraser.saw_self);
        assert_eq!(ty.to_token_stream().to_string().replace(' ', ""), "Option<Self>");
    }

    #[test]
    fn test_self_projection_in_trait_impl() {
        let self_ty: Type = syn::parse_str("Counter").unwrap();
        let trait_path: Path = syn::parse_str("Iterator").unwrap();
        let mut eraser = TypeEraser::for_impl(&self_ty, Some(&trait_path));
        let ty = eraser.erase(&syn::parse_str("Option<Self::Item>").unwrap());
        assert_eq!(eraser.unnameable, None);
        assert_eq!(
            ty.to_token_stream().to_string().replace(' ', ""),
            "Option<<CounterasIterator>::Item>"
        );

        let trait_path: Path = syn::parse_str("Add<Meters>").unwrap();
        let mut eraser = TypeEraser::for_impl(&syn::parse_str("Meters").unwrap(), Some(&trait_path));
        let ty = eraser.erase(&syn::parse_str("Self::Output").unwrap());
        assert_eq!(
            ty.to_token_stream().to_string().replace(' ', ""),
            "<MetersasAdd<Meters>>::Output"
        );
    }

    #[test]
    fn test_self_projection_in_inherent_impl() {
        let mut eraser = TypeEraser::for_impl(&syn::parse_str("Counter").unwrap(), None);
        let ty = eraser.erase(&syn::parse_str("&Self").unwrap());
        assert_eq!(eraser.unnameable, None);
        assert_eq!(ty.to_token_stream().to_string().replace(' ', ""), "::method_probe::Shared<Self>");

        eraser.erase(&syn::parse_str("Vec<Self::Item>").unwrap());
        assert_eq!(eraser.unnameable, Some(Unnameable::SelfProjection));
    }
}
