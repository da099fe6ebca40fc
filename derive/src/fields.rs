use crate::attributes::{BuildableAttributes, FieldAttributes, FieldDefault};
use syn::spanned::Spanned;

/// A struct field together with the variable it is read from
pub(crate) struct Field<'a> {
    pub(crate) ident: &'a syn::Ident,
    pub(crate) var_name: String,
    pub(crate) default: Option<FieldDefault>,
}

pub(crate) enum StructFields<'a> {
    Unit,
    Named(Vec<Field<'a>>),
}

impl<'a> StructFields<'a> {
    pub(crate) fn from_fields(fields: &'a syn::Fields) -> Result<Self, syn::Error> {
        let named = match fields {
            syn::Fields::Named(fields) => &fields.named,
            syn::Fields::Unit => return Ok(StructFields::Unit),
            syn::Fields::Unnamed(fields) => {
                return Err(syn::Error::new(
                    fields.span(),
                    "tuple structs are not supported, variables are looked up by field name",
                ))
            }
        };

        let mut result = Vec::with_capacity(named.len());
        for field in named.iter() {
            let ident = match &field.ident {
                Some(ident) => ident,
                None => return Err(syn::Error::new(field.span(), "field must be named")),
            };
            let attributes = FieldAttributes::from_attributes(field.attrs.iter())?;
            let var_name = attributes.rename.unwrap_or_else(|| {
                let name = ident.to_string();
                name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
            });
            result.push(Field {
                ident,
                var_name,
                default: attributes.default,
            });
        }
        Ok(StructFields::Named(result))
    }
}
