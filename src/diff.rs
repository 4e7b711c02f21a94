//! Shallow change detection between prop projections.

use crate::props::Props;

/// One-level equality over two prop mappings.
///
/// Equal when the key sets match and every value pair is shallowly equal:
/// primitives by value, `Data`/`Action` by reference. Nested structures are
/// never recursed into. A `true` result means the update cycle is skipped and
/// the previous merged props keep their identity.
pub fn shallow_eq(prev: &Props, next: &Props) -> bool {
    if prev.len() != next.len() {
        return false;
    }

    prev.iter().all(|(key, value)| {
        next.get(key)
            .map(|other| value.shallow_eq(other))
            .unwrap_or(false)
    })
}
