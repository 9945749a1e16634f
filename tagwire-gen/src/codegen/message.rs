//! Message property table generation.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;

use crate::descriptor::{DescriptorProto, FieldDescriptorProto, Label, Type};
use crate::Error;

/// Generate the registry block compiling one message's property table.
pub fn message_block(
    proto_name: &str,
    target_name: &str,
    message: &DescriptorProto,
    is_proto3: bool,
    map_entries: &HashSet<String>,
    wrapper: bool,
) -> Result<TokenStream, Error> {
    let syntax = if is_proto3 {
        quote!(::tagwire::props::Syntax::Proto3)
    } else {
        quote!(::tagwire::props::Syntax::Proto2)
    };

    let oneofs: Vec<TokenStream> = message
        .oneof_decl
        .iter()
        .map(|decl| -> Result<TokenStream, Error> {
            let name = decl.name.as_deref().ok_or(Error::MissingName)?;
            Ok(quote!(props.push_oneof(#name);))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fields: Vec<TokenStream> = message
        .field
        .iter()
        .map(|field| -> Result<TokenStream, Error> {
            let props = field_props_tokens(field, is_proto3, map_entries)?;
            Ok(quote!(props.push_field(#props);))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mark_wrapper = wrapper.then(|| quote!(props.wrapper = true;));

    Ok(quote! {
        {
            let mut props = ::tagwire::props::MessageProps::new(#target_name, #syntax);
            #(#oneofs)*
            #(#fields)*
            #mark_wrapper
            registry.register_message(#proto_name, props);
        }
    })
}

/// Generate the `FieldProps` constructor expression for one field.
pub fn field_props_tokens(
    field: &FieldDescriptorProto,
    is_proto3: bool,
    map_entries: &HashSet<String>,
) -> Result<TokenStream, Error> {
    let tag = field.number.ok_or(Error::MissingFieldNumber)?;
    let tag = u32::try_from(tag).map_err(|_| Error::MissingFieldNumber)?;
    let tag = proc_macro2::Literal::u32_suffixed(tag);

    let name = to_snake_case(field.name.as_deref().ok_or(Error::MissingName)?);

    let raw_type = field.r#type.unwrap_or(0);
    let ty = field.field_type().ok_or(Error::InvalidFieldType(raw_type))?;
    let referenced = || -> Result<String, Error> {
        Ok(field
            .type_name
            .as_deref()
            .ok_or(Error::MissingName)?
            .trim_start_matches('.')
            .to_owned())
    };
    let (field_type, is_map, packable) = match ty {
        Type::Message => {
            let key = referenced()?;
            let is_map = map_entries.contains(&key);
            (
                quote!(::tagwire::props::FieldType::Message(#key.into())),
                is_map,
                false,
            )
        }
        Type::Enum => {
            let key = referenced()?;
            (
                quote!(::tagwire::props::FieldType::Enum(#key.into())),
                false,
                true,
            )
        }
        Type::Group => return Err(Error::InvalidFieldType(raw_type)),
        scalar => {
            let kind = scalar_kind_tokens(scalar)?;
            let packable = !matches!(scalar, Type::String | Type::Bytes);
            (
                quote!(::tagwire::props::FieldType::Scalar(#kind)),
                false,
                packable,
            )
        }
    };

    let mut tokens = quote!(::tagwire::props::FieldProps::new(#tag, #name, #field_type));

    match field.label() {
        Label::Repeated if is_map => tokens.extend(quote!(.map_entry())),
        Label::Repeated => {
            // proto3 packs eligible repeated scalars unless told otherwise;
            // proto2 packs only on request.
            let packed = field
                .options
                .as_ref()
                .and_then(|options| options.packed)
                .unwrap_or(is_proto3);
            if packable && packed {
                tokens.extend(quote!(.packed()));
            } else {
                tokens.extend(quote!(.repeated()));
            }
        }
        Label::Required => tokens.extend(quote!(.required())),
        Label::Optional => {}
    }

    if let Some(index) = field.oneof_index {
        let index = usize::try_from(index).map_err(|_| Error::InvalidLabel(index))?;
        let index = proc_macro2::Literal::usize_suffixed(index);
        tokens.extend(quote!(.oneof(#index)));
    }

    Ok(tokens)
}

fn scalar_kind_tokens(ty: Type) -> Result<TokenStream, Error> {
    Ok(match ty {
        Type::Double => quote!(::tagwire::props::ScalarKind::Double),
        Type::Float => quote!(::tagwire::props::ScalarKind::Float),
        Type::Int64 => quote!(::tagwire::props::ScalarKind::Int64),
        Type::Uint64 => quote!(::tagwire::props::ScalarKind::UInt64),
        Type::Int32 => quote!(::tagwire::props::ScalarKind::Int32),
        Type::Fixed64 => quote!(::tagwire::props::ScalarKind::Fixed64),
        Type::Fixed32 => quote!(::tagwire::props::ScalarKind::Fixed32),
        Type::Bool => quote!(::tagwire::props::ScalarKind::Bool),
        Type::String => quote!(::tagwire::props::ScalarKind::String),
        Type::Bytes => quote!(::tagwire::props::ScalarKind::Bytes),
        Type::Uint32 => quote!(::tagwire::props::ScalarKind::UInt32),
        Type::Sfixed32 => quote!(::tagwire::props::ScalarKind::Sfixed32),
        Type::Sfixed64 => quote!(::tagwire::props::ScalarKind::Sfixed64),
        Type::Sint32 => quote!(::tagwire::props::ScalarKind::Sint32),
        Type::Sint64 => quote!(::tagwire::props::ScalarKind::Sint64),
        Type::Group | Type::Message | Type::Enum => {
            return Err(Error::InvalidFieldType(ty as i32))
        }
    })
}

/// Convert a proto field name to its snake_case identifier.
///
/// Handles consecutive uppercase letters: `HTTPServer` -> `http_server`.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev_lower = chars[i - 1].is_lowercase();
                let prev_upper = chars[i - 1].is_uppercase();
                let next_lower = chars.get(i + 1).map(|c| c.is_lowercase()).unwrap_or(false);
                if prev_lower || (prev_upper && next_lower) {
                    result.push('_');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
