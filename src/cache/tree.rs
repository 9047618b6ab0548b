//! Get-or-insert navigation
//!
//! Every level of the record tree is resolved through these two helpers, so
//! creation never replaces a node that is already there. Both report
//! whether they inserted, which is what marks a namespace modified.

use std::collections::BTreeMap;

/// Child of `container` under `key`.
///
/// When the key is missing and `create` is set, `factory()` is inserted
/// first. Returns the child (if any) and whether an insert happened.
pub fn resolve<'a, T>(
    container: &'a mut BTreeMap<String, T>,
    key: &str,
    create: bool,
    factory: impl FnOnce() -> T,
) -> (Option<&'a mut T>, bool) {
    let mut created = false;
    if create && !container.contains_key(key) {
        container.insert(key.to_string(), factory());
        created = true;
    }
    (container.get_mut(key), created)
}

/// Contents of an optional slot, filling it from `factory()` when empty and
/// `create` is set.
pub fn resolve_slot<'a, T>(
    slot: &'a mut Option<T>,
    create: bool,
    factory: impl FnOnce() -> T,
) -> (Option<&'a mut T>, bool) {
    let mut created = false;
    if create && slot.is_none() {
        *slot = Some(factory());
        created = true;
    }
    (slot.as_mut(), created)
}
