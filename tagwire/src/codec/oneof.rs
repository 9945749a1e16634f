//! Oneof group resolution.
//!
//! Oneofs have no wire representation of their own; the active branch is
//! encoded as a regular field. A message value stores the active branch under
//! the group name as a `Value::Branch(field, payload)` pair, mirroring how at
//! most one member of a group may be set.

use alloc::collections::BTreeMap;

use crate::error::EncodeError;
use crate::props::MessageProps;
use crate::value::{MessageValue, Value};

/// Resolve the active branch of every oneof group declared on the message.
///
/// Returns a mapping from member field identifier to its payload. A value
/// under a group name that is not a branch, or a branch naming a field
/// outside the group, fails with [`EncodeError`].
pub(crate) fn resolve_groups<'v>(
    msg: &'v MessageValue,
    props: &'v MessageProps,
) -> Result<BTreeMap<&'v str, &'v Value>, EncodeError> {
    let mut active = BTreeMap::new();
    for (index, group) in props.oneofs().iter().enumerate() {
        let value = match msg.get(group) {
            Some(value) => value,
            None => continue,
        };
        let (field, payload) = match value {
            Value::Branch(field, payload) => (field, payload.as_ref()),
            _ => {
                return Err(EncodeError::OneofShape {
                    message: props.name.clone(),
                    group: group.clone(),
                })
            }
        };
        let member = props
            .field_by_name(field)
            .filter(|f| f.oneof == Some(index))
            .ok_or_else(|| EncodeError::OneofMismatch {
                message: props.name.clone(),
                group: group.clone(),
                branch: field.clone(),
            })?;
        active.insert(member.name.as_str(), payload);
    }
    Ok(active)
}
