//! `#[inject(...)]` field attribute helpers

use syn::{Attribute, LitStr, Result};

/// How a single field is obtained when the struct is injected
#[derive(Debug)]
pub(crate) enum FieldSource {
    /// Extracted with `FromResolver`
    Resolve,

    /// Resolved from a named binding (e.g. `#[inject(name = "primary")]`)
    Named(LitStr),

    /// Initialized with `Default::default()` (e.g. `#[inject(default)]`)
    Default,
}

impl FieldSource {
    /// Reads the `#[inject(...)]` attributes of a field.
    ///
    /// Fields without the attribute are resolved. Returns an error for unknown
    /// keys or when both `name` and `default` are given.
    pub(crate) fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut source = FieldSource::Resolve;
        for attr in attrs.iter().filter(|a| a.path().is_ident("inject")) {
            attr.parse_nested_meta(|meta| {
                let next = if meta.path.is_ident("name") {
                    FieldSource::Named(meta.value()?.parse()?)
                } else if meta.path.is_ident("default") {
                    FieldSource::Default
                } else {
                    return Err(meta.error("expected `name = \"...\"` or `default`"));
                };

                if !matches!(source, FieldSource::Resolve) {
                    return Err(meta.error("`name` and `default` cannot be combined"));
                }
                source = next;
                Ok(())
            })?;
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{Field, parse_quote};

    fn source_of(field: Field) -> Result<FieldSource> {
        FieldSource::from_attrs(&field.attrs)
    }

    #[test]
    fn it_resolves_plain_field() {
        let field: Field = parse_quote! { clock: Arc<dyn Clock> };
        assert!(matches!(source_of(field).unwrap(), FieldSource::Resolve));
    }

    #[test]
    fn it_parses_named_field() {
        let field: Field = parse_quote! {
            #[inject(name = "primary")]
            store: Arc<dyn ClientStore>
        };
        match source_of(field).unwrap() {
            FieldSource::Named(lit) => assert_eq!(lit.value(), "primary"),
            other => panic!("Expected named source, got {other:?}"),
        }
    }

    #[test]
    fn it_parses_default_field() {
        let field: Field = parse_quote! {
            #[inject(default)]
            counter: AtomicU64
        };
        assert!(matches!(source_of(field).unwrap(), FieldSource::Default));
    }

    #[test]
    fn it_ignores_foreign_attributes() {
        let field: Field = parse_quote! {
            #[allow(dead_code)]
            clock: Arc<dyn Clock>
        };
        assert!(matches!(source_of(field).unwrap(), FieldSource::Resolve));
    }

    #[test]
    fn it_fails_on_unknown_key() {
        let field: Field = parse_quote! {
            #[inject(lazy)]
            clock: Arc<dyn Clock>
        };
        assert!(source_of(field).is_err());
    }

    #[test]
    fn it_fails_on_conflicting_keys() {
        let field: Field = parse_quote! {
            #[inject(default, name = "primary")]
            clock: Arc<dyn Clock>
        };
        assert!(source_of(field).is_err());
    }
}
