//! Code generation from plugin requests.
//!
//! Each requested `.proto` file renders into one Rust module exposing a
//! `registry()` constructor for the file's compiled property tables, a
//! `TYPES` name mapping, and optionally the raw descriptor bytes.

mod enumeration;
mod message;

use std::collections::{BTreeMap, HashSet};

use proc_macro2::TokenStream;
use quote::quote;

use crate::config::Config;
use crate::context::{self, Context, TypeMetadata};
use crate::descriptor::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto};
use crate::plugin::{CodeGeneratorRequest, CodeGeneratorResponse, ResponseFile};
use crate::Error;

/// Run the generator over a decoded request.
///
/// Every file in the request is indexed so cross-file references resolve;
/// only the files named in `file_to_generate` produce output.
pub fn generate(request: &CodeGeneratorRequest) -> Result<CodeGeneratorResponse, Error> {
    let config = Config::parse(request.parameter.as_deref().unwrap_or(""));

    let mut global: BTreeMap<String, BTreeMap<String, TypeMetadata>> = BTreeMap::new();
    for file in &request.proto_file {
        let file_name = file.name.clone().unwrap_or_default();
        let types = Context::for_file(&config, file).index_file(file);
        global.insert(file_name, types);
    }

    let mut response = CodeGeneratorResponse::default();
    for name in &request.file_to_generate {
        let file = request
            .file(name)
            .ok_or_else(|| Error::UnknownFile(name.clone()))?;
        let types = global
            .get(name.as_str())
            .ok_or_else(|| Error::UnknownFile(name.clone()))?;
        let content = generate_file(&config, file, types)?;
        response.file.push(ResponseFile {
            name: rust_file_name(name),
            content,
        });
    }
    Ok(response)
}

/// Render one `.proto` file into Rust module source.
fn generate_file(
    config: &Config,
    file: &FileDescriptorProto,
    types: &BTreeMap<String, TypeMetadata>,
) -> Result<String, Error> {
    let is_proto3 = file.syntax.as_deref() == Some("proto3");
    let package_prefix = match file.package.as_deref() {
        Some(package) if !package.is_empty() => format!("{package}."),
        _ => String::new(),
    };

    // Flatten the message tree into (proto-qualified key, descriptor) pairs.
    let mut messages = Vec::new();
    for descriptor in &file.message_type {
        walk_messages(&package_prefix, descriptor, &mut messages);
    }

    let map_entries: HashSet<String> = messages
        .iter()
        .filter(|(_, descriptor)| {
            descriptor
                .options
                .as_ref()
                .and_then(|options| options.map_entry)
                .unwrap_or(false)
        })
        .map(|(key, _)| key.clone())
        .collect();

    let mut enums: Vec<(String, &EnumDescriptorProto)> = Vec::new();
    for decl in &file.enum_type {
        if let Some(name) = decl.name.as_deref() {
            enums.push((format!("{package_prefix}{name}"), decl));
        }
    }
    for (key, descriptor) in &messages {
        for decl in &descriptor.enum_type {
            if let Some(name) = decl.name.as_deref() {
                enums.push((format!("{key}.{name}"), decl));
            }
        }
    }

    let target_name = |key: &str| {
        types
            .get(key)
            .map(|metadata| metadata.module_name.clone())
            .unwrap_or_else(|| context::normalize(key))
    };

    let mut blocks: Vec<TokenStream> = Vec::new();
    for (key, descriptor) in &messages {
        let wrapper = types.get(key).map(|m| m.wrapper).unwrap_or(false);
        blocks.push(message::message_block(
            key,
            &target_name(key),
            descriptor,
            is_proto3,
            &map_entries,
            wrapper,
        )?);
    }
    for (key, decl) in &enums {
        blocks.push(enumeration::enum_block(key, &target_name(key), decl)?);
    }

    // Extensions register into the side-table consulted by the encoder:
    // file-level ones under the file's module, message-level ones under the
    // enclosing message's module.
    let file_module = file_module_name(config, file);
    for extension in &file.extension {
        blocks.push(extension_block(&file_module, extension, is_proto3, &map_entries)?);
    }
    for (key, descriptor) in &messages {
        for extension in &descriptor.extension {
            blocks.push(extension_block(&target_name(key), extension, is_proto3, &map_entries)?);
        }
    }

    // The name mapping makes wrapper aliasing observable to consumers; the
    // synthetic map entry types are omitted.
    let type_entries: Vec<TokenStream> = types
        .iter()
        .filter(|(key, _)| !map_entries.contains(key.as_str()))
        .map(|(key, metadata)| {
            let type_name = &metadata.type_name;
            quote!((#key, #type_name))
        })
        .collect();

    let typespec_entries: Vec<TokenStream> = types
        .iter()
        .filter_map(|(key, metadata)| {
            metadata
                .typespec
                .as_ref()
                .map(|typespec| quote!((#key, #typespec)))
        })
        .collect();
    let typespecs = (!typespec_entries.is_empty()).then(|| {
        quote! {
            pub const TYPESPECS: &[(&str, &str)] = &[#(#typespec_entries),*];
        }
    });

    let descriptor = config.gen_descriptors.then(|| {
        let bytes = proc_macro2::Literal::byte_string(&file.raw);
        quote! {
            pub const FILE_DESCRIPTOR: &[u8] = #bytes;
        }
    });

    let tokens = quote! {
        pub fn registry() -> ::tagwire::props::TypeRegistry {
            let mut registry = ::tagwire::props::TypeRegistry::new();
            #(#blocks)*
            registry
        }

        pub const TYPES: &[(&str, &str)] = &[#(#type_entries),*];

        #typespecs

        #descriptor
    };

    let ast: syn::File = syn::parse2(tokens)?;
    let mut content = String::from("// Generated by protoc-gen-tagwire. Do not edit.\n");
    content.push_str(&prettyplease::unparse(&ast));
    Ok(content)
}

fn extension_block(
    module: &str,
    extension: &FieldDescriptorProto,
    is_proto3: bool,
    map_entries: &HashSet<String>,
) -> Result<TokenStream, Error> {
    let name = message::to_snake_case(extension.name.as_deref().ok_or(Error::MissingName)?);
    let props = message::field_props_tokens(extension, is_proto3, map_entries)?;
    Ok(quote! {
        registry.register_extension(#module, #name, #props);
    })
}

fn walk_messages<'a>(
    prefix: &str,
    message: &'a DescriptorProto,
    out: &mut Vec<(String, &'a DescriptorProto)>,
) {
    let name = match message.name.as_deref() {
        Some(name) => name,
        None => return,
    };
    let key = format!("{prefix}{name}");
    let nested_prefix = format!("{key}.");
    out.push((key, message));
    for nested in &message.nested_type {
        walk_messages(&nested_prefix, nested, out);
    }
}

/// The module extensions of a file register under: the module prefix or
/// package, normalized.
fn file_module_name(config: &Config, file: &FileDescriptorProto) -> String {
    let ctx = Context::for_file(config, file);
    let leading = ctx
        .module_prefix
        .as_deref()
        .or(ctx.package.as_deref())
        .unwrap_or("");
    context::normalize(leading)
}

/// Map `dir/foo.proto` to `dir/foo.rs`.
fn rust_file_name(proto_name: &str) -> String {
    let stem = proto_name.strip_suffix(".proto").unwrap_or(proto_name);
    format!("{stem}.rs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_file_name() {
        assert_eq!(rust_file_name("demo.proto"), "demo.rs");
        assert_eq!(rust_file_name("dir/nested.proto"), "dir/nested.rs");
        assert_eq!(rust_file_name("odd.name"), "odd.name.rs");
    }
}
