//! Default resolution.
//!
//! Defaults come from the provider captured at registration, never from the
//! accessor or the store, so computing one can't recurse.

use crate::error::AccessError;
use crate::schema::ItemDescriptor;
use crate::value::Value;

/// Compute the declared default for `item`.
///
/// `Ok(None)` when the item declares no default. A provider that fails or
/// yields a value of the wrong type is a [`AccessError::DefaultInvocation`].
pub fn default_of(item: &ItemDescriptor) -> Result<Option<Value>, AccessError> {
    let Some(provider) = item.default_provider() else {
        return Ok(None);
    };

    let value = provider().map_err(|reason| AccessError::DefaultInvocation {
        group: item.group.clone(),
        key: item.key.clone(),
        reason,
    })?;

    item.normalize(&value)
        .map(Some)
        .ok_or_else(|| AccessError::DefaultInvocation {
            group: item.group.clone(),
            key: item.key.clone(),
            reason: format!(
                "provider returned {} for an item declared as {}",
                value.type_name(),
                item.value_type
            ),
        })
}
