//! Proc-Macros implementations for Tether dependency injection

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod di;

/// Implements the `Inject` trait for a struct by resolving each of its fields.
///
/// Fields are extracted with `FromResolver`, so `Arc<T>` fields resolve the
/// `T` binding and `Option<Arc<T>>` fields resolve it if it is registered.
///
/// Field attributes:
/// - `#[inject(name = "...")]` resolves an `Arc<T>` field from a named binding
/// - `#[inject(default)]` initializes the field with [`Default`] instead
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use tether::di::Inject;
///
/// #[derive(Inject)]
/// struct TokenService {
///     clock: Arc<dyn Clock>,
///     #[inject(name = "tokens")]
///     store: Arc<dyn TokenStore>,
///     #[inject(default)]
///     issued: AtomicU64,
/// }
/// ```
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    di::expand_inject(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
