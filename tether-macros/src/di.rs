//! Macros for dependency injection

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;

use self::attr::FieldSource;

pub(super) mod attr;

/// Expands a derive-macro for `Inject`
pub(super) fn expand_inject(input: &syn::DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let syn::Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "`Inject` can only be derived for structs"
        ));
    };

    let body = match &data.fields {
        syn::Fields::Named(fields) => {
            let values = fields.named
                .iter()
                .map(|field| {
                    let ident = &field.ident;
                    let value = field_value(field)?;
                    Ok(quote! { #ident: #value })
                })
                .collect::<syn::Result<Vec<_>>>()?;
            quote! { Self { #(#values),* } }
        }
        syn::Fields::Unnamed(fields) => {
            let values = fields.unnamed
                .iter()
                .map(field_value)
                .collect::<syn::Result<Vec<_>>>()?;
            quote! { Self(#(#values),*) }
        }
        syn::Fields::Unit => quote! { Self },
    };

    Ok(quote! {
        impl #impl_generics ::tether::di::Inject for #name #ty_generics #where_clause {
            #[inline]
            #[allow(unused_variables)]
            fn inject(resolver: &::tether::di::Resolver) -> ::core::result::Result<Self, ::tether::di::error::Error> {
                ::core::result::Result::Ok(#body)
            }
        }
    })
}

/// Builds the expression that produces a single field
fn field_value(field: &syn::Field) -> syn::Result<TokenStream> {
    let ty = &field.ty;
    let value = match FieldSource::from_attrs(&field.attrs)? {
        FieldSource::Resolve => quote_spanned! { ty.span() =>
            <#ty as ::tether::di::FromResolver>::from_resolver(resolver)?
        },
        FieldSource::Named(name) => quote_spanned! { ty.span() =>
            resolver.resolve_named_shared(#name)?
        },
        FieldSource::Default => quote_spanned! { ty.span() =>
            <#ty as ::core::default::Default>::default()
        },
    };
    Ok(value)
}
