use syn::spanned::Spanned;
use syn::Error;

fn unknown_attr_error(path: &syn::Path) -> Error {
    match path.get_ident() {
        Some(ident) => Error::new(path.span(), format!("Unknown attribute: {}", ident)),
        None => Error::new(path.span(), "Unknown attribute"),
    }
}

pub(crate) trait BuildableAttributes {
    fn visit_name_value(&mut self, name_value: &syn::MetaNameValue) -> Result<(), Error> {
        Err(unknown_attr_error(&name_value.path))
    }

    fn visit_path(&mut self, path: &syn::Path) -> Result<(), Error> {
        Err(unknown_attr_error(path))
    }

    fn visit_list(&mut self, list: &syn::MetaList) -> Result<(), Error> {
        Err(unknown_attr_error(&list.path))
    }

    fn from_attributes<'a>(attrs: impl Iterator<Item = &'a syn::Attribute>) -> Result<Self, Error>
    where
        Self: Default,
    {
        let mut attributes = Self::default();

        for attr in attrs {
            if !compare_path(&attr.path, "cly") {
                continue;
            }
            let inner = match attr.parse_meta()? {
                syn::Meta::List(list) => list,
                syn::Meta::Path(path) => {
                    return Err(Error::new(path.span(), "Missing argument parameters"));
                }
                syn::Meta::NameValue(name_value) => {
                    return Err(Error::new(
                        name_value.span(),
                        "Key-value argument style is not allowed",
                    ));
                }
            };

            for nested in inner.nested.iter() {
                let meta = match nested {
                    syn::NestedMeta::Meta(meta) => meta,
                    syn::NestedMeta::Lit(lit) => {
                        return Err(Error::new(lit.span(), "Unexpected literal"))
                    }
                };
                match meta {
                    syn::Meta::Path(path) => attributes.visit_path(path)?,
                    syn::Meta::NameValue(name_value) => attributes.visit_name_value(name_value)?,
                    syn::Meta::List(list) => attributes.visit_list(list)?,
                }
            }
        }

        Ok(attributes)
    }
}

fn compare_path(path: &syn::Path, name: &str) -> bool {
    matches!(path.get_ident(), Some(ident) if ident == name)
}

fn get_name_value_string(name_value: &syn::MetaNameValue) -> Result<String, Error> {
    if let syn::Lit::Str(string) = &name_value.lit {
        Ok(string.value())
    } else {
        Err(Error::new(name_value.lit.span(), "Expected a string"))
    }
}

/// How a field is filled in when no variable was collected for it
#[derive(Debug)]
pub(crate) enum FieldDefault {
    /// `Default::default()`
    Trait,
    Expr(Box<syn::Expr>),
}

#[derive(Debug, Default)]
pub(crate) struct FieldAttributes {
    pub(crate) rename: Option<String>,
    pub(crate) default: Option<FieldDefault>,
}

impl FieldAttributes {
    fn set_default(&mut self, default: FieldDefault, span: proc_macro2::Span) -> Result<(), Error> {
        if self.default.is_some() {
            return Err(Error::new(span, "default attribute cannot be used more than once"));
        }
        self.default = Some(default);
        Ok(())
    }
}

impl BuildableAttributes for FieldAttributes {
    fn visit_path(&mut self, path: &syn::Path) -> Result<(), Error> {
        if compare_path(path, "default") {
            self.set_default(FieldDefault::Trait, path.span())
        } else {
            Err(unknown_attr_error(path))
        }
    }

    fn visit_name_value(&mut self, name_value: &syn::MetaNameValue) -> Result<(), Error> {
        if compare_path(&name_value.path, "rename") {
            if self.rename.is_some() {
                return Err(Error::new(
                    name_value.span(),
                    "rename attribute cannot be used more than once",
                ));
            }
            let name = get_name_value_string(name_value)?;
            if name.is_empty() {
                return Err(Error::new(name_value.lit.span(), "Variable name cannot be empty"));
            }
            self.rename = Some(name);
            Ok(())
        } else if compare_path(&name_value.path, "default") {
            let string = get_name_value_string(name_value)?;
            let expr = syn::parse_str::<syn::Expr>(&string)?;
            self.set_default(FieldDefault::Expr(Box::new(expr)), name_value.span())
        } else {
            Err(unknown_attr_error(&name_value.path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildableAttributes, FieldAttributes, FieldDefault};
    use proc_macro2::{Span, TokenStream};
    use quote::quote;

    fn make_attribute(path_str: &str, tokens: TokenStream) -> syn::Attribute {
        syn::Attribute {
            pound_token: syn::token::Pound {
                spans: [Span::call_site()],
            },
            style: syn::AttrStyle::Outer,
            bracket_token: syn::token::Bracket {
                span: Span::call_site(),
            },
            path: syn::parse_str(path_str).unwrap(),
            tokens,
        }
    }

    mod field_attributes {
        use super::*;

        #[test]
        fn parse_empty() {
            let attributes = FieldAttributes::from_attributes(std::iter::empty()).unwrap();
            assert!(attributes.rename.is_none());
            assert!(attributes.default.is_none());
        }

        #[test]
        fn parse_rename_and_default() {
            let attrs = [
                make_attribute("doc", quote! {= "ignored"}),
                make_attribute("cly", quote! {(rename = "file-name", default)}),
            ];
            let attributes = FieldAttributes::from_attributes(attrs.iter()).unwrap();
            assert_eq!(attributes.rename.as_deref(), Some("file-name"));
            assert!(matches!(attributes.default, Some(FieldDefault::Trait)));
        }

        #[test]
        fn parse_default_expression() {
            let attrs = [make_attribute("cly", quote! {(default = "22 + 1")})];
            let attributes = FieldAttributes::from_attributes(attrs.iter()).unwrap();
            assert!(
                matches!(attributes.default, Some(FieldDefault::Expr(expr)) if quote!{#expr}.to_string() == "22 + 1")
            );
        }

        #[test]
        fn error_duplicate_default() {
            let attrs = [make_attribute("cly", quote! {(default, default = "1")})];
            let error = FieldAttributes::from_attributes(attrs.iter()).unwrap_err();
            assert_eq!(
                &error.to_string(),
                "default attribute cannot be used more than once"
            );
        }

        #[test]
        fn error_unknown() {
            let attrs = [make_attribute("cly", quote! {(required)})];
            let error = FieldAttributes::from_attributes(attrs.iter()).unwrap_err();
            assert_eq!(&error.to_string(), "Unknown attribute: required");
        }

        #[test]
        fn error_key_value_style() {
            let attrs = [make_attribute("cly", quote! {= "x"})];
            let error = FieldAttributes::from_attributes(attrs.iter()).unwrap_err();
            assert_eq!(&error.to_string(), "Key-value argument style is not allowed");
        }

        #[test]
        fn error_not_a_string() {
            let attrs = [make_attribute("cly", quote! {(rename = 5)})];
            let error = FieldAttributes::from_attributes(attrs.iter()).unwrap_err();
            assert_eq!(&error.to_string(), "Expected a string");
        }
    }
}
