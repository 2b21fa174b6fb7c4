//! User-facing macro implementations
//!
//! # Macro Names
//!
//! | Macro | Usage | Purpose |
//! |-------|-------|---------|
//! | `#[methods]` | on impl block | Register members for detection |
//! | `method_form!` | item macro | Declare a named shape with a variable tail |
//! | `method_signature!` | item macro | Declare a named exact signature |
//! | `form!` / `signature!` | type macro | Inline shape / signature |
//! | `has_method_form!` | expression macro | Fixed-arity or bounded-search probe |
//! | `method_form_arity!` | expression macro | Smallest matching arity |

pub mod detect;
pub mod form;
pub mod methods;

pub use detect::{expand_has_method_form, expand_method_form_arity, ProbeInput};
pub use form::{expand_inline_shape, expand_named_shapes, NamedShapes, ShapeKind};
pub use methods::expand_methods;
