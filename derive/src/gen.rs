use crate::attributes::FieldDefault;
use crate::fields::{Field, StructFields};
use proc_macro2::TokenStream;
use quote::quote;

fn field_value(field: &Field) -> TokenStream {
    let var_name = &field.var_name;
    match &field.default {
        None => quote! { vars.get(#var_name)? },
        Some(FieldDefault::Trait) => {
            quote! { vars.get_or_else(#var_name, ::std::default::Default::default)? }
        }
        Some(FieldDefault::Expr(expr)) => quote! { vars.get_or_else(#var_name, || #expr)? },
    }
}

pub(crate) fn from_vars_body(type_name: &syn::Ident, fields: &StructFields) -> TokenStream {
    match fields {
        StructFields::Unit => quote! { ::std::result::Result::Ok(#type_name) },
        StructFields::Named(fields) => {
            let initializers = fields.iter().map(|field| {
                let ident = field.ident;
                let value = field_value(field);
                quote! { #ident: #value }
            });
            quote! { ::std::result::Result::Ok(#type_name { #(#initializers),* }) }
        }
    }
}

pub(crate) fn from_vars_impl(input: &syn::DeriveInput, fields: &StructFields) -> TokenStream {
    let type_name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();
    let body = from_vars_body(type_name, fields);
    let vars_ident = match fields {
        StructFields::Named(fields) if !fields.is_empty() => quote! { vars },
        _ => quote! { _vars },
    };

    quote! {
        impl #impl_generics ::cly::FromVars for #type_name #type_generics #where_clause {
            fn from_vars(#vars_ident: &::cly::Vars) -> ::std::result::Result<Self, ::cly::ArgumentError> {
                #body
            }
        }
    }
}
