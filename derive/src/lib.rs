mod attributes;
mod fields;
mod gen;

use fields::StructFields;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::spanned::Spanned;

fn derive_struct(input: &syn::DeriveInput, data: &syn::DataStruct) -> Result<TokenStream2, syn::Error> {
    let fields = StructFields::from_fields(&data.fields)?;
    Ok(gen::from_vars_impl(input, &fields))
}

#[proc_macro_derive(FromVars, attributes(cly))]
pub fn derive_from_vars(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let result = match &input.data {
        syn::Data::Struct(data) => derive_struct(&input, data),
        syn::Data::Enum(data) => Err(syn::Error::new(
            data.enum_token.span(),
            "FromVars can only be derived for structs",
        )),
        syn::Data::Union(data) => Err(syn::Error::new(
            data.union_token.span(),
            "FromVars can only be derived for structs",
        )),
    };
    match result {
        Ok(token_stream) => token_stream.into(),
        Err(error) => error.into_compile_error().into(),
    }
}
