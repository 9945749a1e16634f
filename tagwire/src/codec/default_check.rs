//! The emptiness policy: decides whether a field value is skipped.
//!
//! proto3 tracks presence implicitly, so scalar defaults are elided from the
//! wire; proto2 tracks presence explicitly, so a present default still gets a
//! record. Required fields and explicitly set oneof branches always emit.

use crate::codec::scalar::enum_number;
use crate::props::{FieldProps, FieldType, Syntax, TypeRegistry};
use crate::value::Value;

/// Returns true when the field produces no wire record.
///
/// `oneof_set` marks values read out of an explicitly set oneof branch; those
/// bypass scalar-default and enum-default suppression.
pub(crate) fn should_skip(
    field: &FieldProps,
    syntax: Syntax,
    value: Option<&Value>,
    oneof_set: bool,
    registry: &TypeRegistry,
) -> bool {
    let value = match value {
        // Absent values are always skipped; required-absent is rejected by
        // the encoder before the policy runs.
        None => return true,
        Some(value) => value,
    };

    match value {
        Value::List(items) if items.is_empty() => return true,
        Value::Map(entries) if entries.is_empty() => return true,
        _ => {}
    }

    // Enum-default suppression applies in both syntaxes.
    if !oneof_set && !field.required && !field.repeated {
        if let FieldType::Enum(name) = &field.ty {
            if let Some(props) = registry.enumeration(name) {
                if enum_number(props, value) == Ok(0) {
                    return true;
                }
            }
        }
    }

    if syntax == Syntax::Proto3 && !oneof_set && !field.repeated {
        if let FieldType::Scalar(_) = field.ty {
            if is_scalar_default(value) {
                return true;
            }
        }
    }

    false
}

/// The proto3 implicit-presence defaults: `0`, `0.0`, `false`, empty string,
/// empty bytes.
fn is_scalar_default(value: &Value) -> bool {
    match value {
        Value::Int(v) => *v == 0,
        Value::UInt(v) => *v == 0,
        Value::Double(v) => *v == 0.0,
        Value::Bool(v) => !*v,
        Value::Str(v) => v.is_empty(),
        Value::Bytes(v) => v.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{EnumProps, FieldProps, FieldType, ScalarKind};
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;

    fn registry_with_month() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register_enum(
            "demo.Month",
            EnumProps::new("Month")
                .with_symbol("UNKNOWN", 0)
                .with_symbol("JANUARY", 2),
        );
        registry
    }

    #[test]
    fn test_proto3_scalar_defaults_skip() {
        let registry = TypeRegistry::new();
        let field = FieldProps::new(1, "a", FieldType::Scalar(ScalarKind::Int32));

        assert!(should_skip(&field, Syntax::Proto3, Some(&Value::Int(0)), false, &registry));
        assert!(!should_skip(&field, Syntax::Proto3, Some(&Value::Int(1)), false, &registry));

        // The same value inside a set oneof branch is emitted.
        assert!(!should_skip(&field, Syntax::Proto3, Some(&Value::Int(0)), true, &registry));

        // proto2 keeps explicitly present defaults.
        assert!(!should_skip(&field, Syntax::Proto2, Some(&Value::Int(0)), false, &registry));
    }

    #[test]
    fn test_absent_and_empty_collections_skip() {
        let registry = TypeRegistry::new();
        let field = FieldProps::new(1, "a", FieldType::Scalar(ScalarKind::Int32));
        assert!(should_skip(&field, Syntax::Proto2, None, false, &registry));
        assert!(should_skip(&field, Syntax::Proto3, None, false, &registry));

        let repeated = FieldProps::new(1, "a", FieldType::Scalar(ScalarKind::Int32)).repeated();
        assert!(should_skip(
            &repeated,
            Syntax::Proto3,
            Some(&Value::List(Vec::new())),
            false,
            &registry
        ));

        let map = FieldProps::new(1, "a", FieldType::Message("demo.Entry".into())).map_entry();
        assert!(should_skip(
            &map,
            Syntax::Proto3,
            Some(&Value::Map(BTreeMap::new())),
            false,
            &registry
        ));
    }

    #[test]
    fn test_enum_default_suppression() {
        let registry = registry_with_month();
        let field = FieldProps::new(1, "month", FieldType::Enum("demo.Month".into()));

        assert!(should_skip(
            &field,
            Syntax::Proto3,
            Some(&Value::Sym("UNKNOWN".into())),
            false,
            &registry
        ));
        assert!(should_skip(&field, Syntax::Proto2, Some(&Value::Int(0)), false, &registry));
        assert!(!should_skip(
            &field,
            Syntax::Proto3,
            Some(&Value::Sym("JANUARY".into())),
            false,
            &registry
        ));

        // Required fields and set oneof branches bypass the suppression.
        let required = FieldProps::new(1, "month", FieldType::Enum("demo.Month".into())).required();
        assert!(!should_skip(
            &required,
            Syntax::Proto2,
            Some(&Value::Int(0)),
            false,
            &registry
        ));
        assert!(!should_skip(&field, Syntax::Proto3, Some(&Value::Int(0)), true, &registry));
    }

    #[test]
    fn test_repeated_values_not_suppressed() {
        let registry = registry_with_month();
        let field = FieldProps::new(1, "a", FieldType::Scalar(ScalarKind::Int32)).repeated();

        // A non-empty list of zeros still emits every element.
        let zeros = Value::List(alloc::vec![Value::Int(0), Value::Int(0)]);
        assert!(!should_skip(&field, Syntax::Proto3, Some(&zeros), false, &registry));
    }
}
