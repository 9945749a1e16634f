//! Enum symbol table generation.

use proc_macro2::TokenStream;
use quote::quote;

use crate::descriptor::EnumDescriptorProto;
use crate::Error;

/// Generate the registry block compiling one enum's symbol table.
pub fn enum_block(
    proto_name: &str,
    target_name: &str,
    enumeration: &EnumDescriptorProto,
) -> Result<TokenStream, Error> {
    let symbols: Vec<TokenStream> = enumeration
        .value
        .iter()
        .map(|value| -> Result<TokenStream, Error> {
            let symbol = value.name.as_deref().ok_or(Error::MissingName)?;
            let number = value.number.ok_or(Error::MissingFieldNumber)?;
            let number = proc_macro2::Literal::i32_suffixed(number);
            Ok(quote!(props.push_symbol(#symbol, #number);))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        {
            let mut props = ::tagwire::props::EnumProps::new(#target_name);
            #(#symbols)*
            registry.register_enum(#proto_name, props);
        }
    })
}
