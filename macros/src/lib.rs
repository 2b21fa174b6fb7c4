//! Procedural macros for the method-probe detection system
//!
//! # Macro API
//!
//! | Macro | Target | Purpose |
//! |-------|--------|---------|
//! | `#[methods]` | impl block | Register members as `Method<Name, Arity>` |
//! | `method_form!{}` | - | Declare a shape with a variable tail |
//! | `method_signature!{}` | - | Declare an exact signature |
//! | `form!()` / `signature!()` | type | Inline shape / signature |
//! | `has_method_form!()` | expr | Probe one arity or search a range |
//! | `method_form_arity!()` | expr | Smallest matching arity |
//! | `name!()` | type | Type-level method name |
//!
//! ## Example
//!
//! ```ignore
//! // 1. Register members
//! #[methods]
//! impl Perceptron {
//!     pub fn train(&mut self, data: &Matrix, epochs: usize) { ... }
//! }
//!
//! // 2. Declare a shape and a detector
//! method_form! {
//!     pub struct TrainForm = fn(&mut self, &Matrix, ..);
//! }
//! method_detector!(pub HasTrain = train);
//!
//! // 3. Check at compile time
//! const TRAINS: bool = has_method_form!(HasTrain<TrainForm, Perceptron>);
//! ```

use proc_macro::TokenStream;
use syn::parse_macro_input;

// =============================================================================
// Module Declarations (Three-tier: inner / common / user)
// =============================================================================

mod common;
mod inner;
mod user;

use user::ShapeKind;

// =============================================================================
// Internal Macros (inner/)
// =============================================================================

/// Generate Peano number type aliases D0..Dn.
///
/// # Usage
/// ```ignore
/// peano!(64);  // Generates D0 = Z, D1 = S<D0>, ..., D64 = S<D63>
/// ```
#[proc_macro]
pub fn peano(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as inner::peano::PeanoInput);
    inner::peano::expand_peano(input).into()
}

/// Type-level identity of a method name.
///
/// # Usage
/// ```ignore
/// type Train = name!(train);   // Name<(Ch<'t'>, Ch<'r'>, Ch<'a'>, Ch<'i'>, Ch<'n'>)>
/// type Kw = name!(r#type);     // same as name!("type")
/// ```
#[proc_macro]
pub fn name(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as inner::name::NameInput);
    inner::name::expand_name(input).into()
}

// =============================================================================
// Registration
// =============================================================================

/// Register the members of an impl block for detection.
///
/// Works on inherent impls and trait impls. Each associated fn with a plain
/// signature gets a `Method<name!(fn_name), Arity>` impl. Overloads are
/// expressed through several trait impls, or through `rename`:
///
/// ```ignore
/// #[methods]
/// impl Quadratic {
///     pub fn evaluate(&self, x: &[f64]) -> f64 { ... }
///
///     // Registered as a second `evaluate`, with three arguments
///     #[method(rename = "evaluate")]
///     pub fn evaluate_batch(&self, x: &[f64], begin: usize, size: usize) -> f64 { ... }
///
///     // Not registered
///     #[method(skip)]
///     fn scratch(&self) {}
/// }
/// ```
///
/// Registering two members under one name with the same number of arguments
/// is a conflicting-impls error.
#[proc_macro_attribute]
pub fn methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as syn::Item);
    match user::expand_methods(attr.into(), item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// =============================================================================
// Shapes
// =============================================================================

/// Declare named method forms: a receiver, a fixed prefix, `..` for the
/// variable tail, and an output. `Self` stands for the probed class.
///
/// # Usage
/// ```ignore
/// method_form! {
///     /// `fn evaluate(&self, &[f64], ..) -> f64`
///     pub struct EvaluateForm = fn(&self, &[f64], ..) -> f64;
///
///     pub struct CombineForm = fn(self, other: Self, ..) -> Self;
/// }
/// ```
#[proc_macro]
pub fn method_form(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as user::NamedShapes);
    match user::expand_named_shapes(input, ShapeKind::Form) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Declare named exact signatures. `Self` stands for the probed class.
///
/// # Usage
/// ```ignore
/// method_signature! {
///     pub struct DescribeSig = fn(&self) -> String;
///     pub struct CloneSig = fn(&self) -> Self;
/// }
/// ```
#[proc_macro]
pub fn method_signature(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as user::NamedShapes);
    match user::expand_named_shapes(input, ShapeKind::Signature) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Inline method form in type position. Cannot mention `Self`.
///
/// # Usage
/// ```ignore
/// type EvaluateForm = form!(fn(&self, &[f64], ..) -> f64);
/// ```
#[proc_macro]
pub fn form(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as common::ShapeSyntax);
    match user::expand_inline_shape(input, ShapeKind::Form) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Inline exact signature in type position. Cannot mention `Self`.
///
/// # Usage
/// ```ignore
/// type ResizeSig = signature!(fn(&mut self, width: u32, height: u32));
/// ```
#[proc_macro]
pub fn signature(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as common::ShapeSyntax);
    match user::expand_inline_shape(input, ShapeKind::Signature) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Compile-time check that a class has a method of a given form.
///
/// The argument is a detector applied to a form and a class. Without options
/// every trailing arity in `0..=7` is probed and the answer is `true` if any
/// of them matches. `max = N` changes the bound; `arity = N` probes a single
/// arity. A probe that does not match is `false`, never a compile error.
///
/// Only meaningful for concrete types; in generic code use the
/// `HasMethodForm` / `MatchesAt` bounds instead.
///
/// # Usage
/// ```ignore
/// method_detector!(HasTrain = train);
///
/// assert!(has_method_form!(HasTrain<TrainForm, Perceptron>));
/// assert!(has_method_form!(HasTrain<TrainForm, Perceptron>, arity = 1));
/// assert!(!has_method_form!(HasTrain<TrainForm, Perceptron>, arity = 0));
/// assert!(!has_method_form!(HasTrain<TrainForm, Perceptron>, max = 0));
///
/// // Usable in const context
/// const TRAINS: bool = has_method_form!(HasTrain<TrainForm, Perceptron>);
/// ```
#[proc_macro]
pub fn has_method_form(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as user::ProbeInput);
    user::expand_has_method_form(input).into()
}

/// Smallest trailing arity at which a class has a method of a given form.
///
/// Same search as `has_method_form!`, returning `Option<usize>`.
///
/// # Usage
/// ```ignore
/// assert_eq!(method_form_arity!(HasTrain<TrainForm, Perceptron>), Some(1));
/// assert_eq!(method_form_arity!(HasTrain<TrainForm, Perceptron>, max = 0), None);
/// ```
#[proc_macro]
pub fn method_form_arity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as user::ProbeInput);
    match user::expand_method_form_arity(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
