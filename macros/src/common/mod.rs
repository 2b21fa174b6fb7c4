// Common utilities shared between internal and user-facing macros
//
// This module contains:
// - erase: Lifetime erasure for signature types
// - shape: `fn(..) -> T` shape parsing
// - parse_utils: Common parsing helpers

mod erase;
mod parse_utils;
mod shape;

pub use erase::*;
pub use parse_utils::*;
pub use shape::*;

use proc_macro2::TokenStream;
use quote::quote;

/// Path of the runtime crate in generated code.
pub fn krate() -> TokenStream {
    quote! { ::method_probe }
}
