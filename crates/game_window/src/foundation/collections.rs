//! Specialized collection types

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle returned when an input handler is registered with a window
    pub struct InputHandlerId;

    /// Handle returned when a render module is registered with a window
    pub struct RenderModuleId;
}

/// Handle-based map using slot map for stable references.
///
/// Registration order is preserved for iteration as long as nothing is
/// removed; removal frees the slot for reuse.
pub type HandleMap<K, T> = SlotMap<K, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_handle_is_stale() {
        let mut map: HandleMap<InputHandlerId, u32> = HandleMap::with_key();
        let a = map.insert(1);
        let b = map.insert(2);
        assert_eq!(map.remove(a), Some(1));
        assert!(map.get(a).is_none());
        assert_eq!(map.get(b), Some(&2));
    }
}
