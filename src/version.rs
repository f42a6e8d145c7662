// ─── Version Comparison ───
// Dotted installer/package version strings, compared numerically.

use std::cmp::Ordering;

use tracing::warn;

/// Compare two dotted version strings component by component.
///
/// Each component is parsed as an integer; a component that fails to parse is
/// treated as `0` (with a warning). Missing trailing components also read as
/// `0`, so `"1.2"` equals `"1.2.0"` and `"2.0"` exceeds `"1.9.9"`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.trim().split('.').collect();
    let right: Vec<&str> = b.trim().split('.').collect();

    let len = left.len().max(right.len());
    for i in 0..len {
        let l = component(&left, i, a);
        let r = component(&right, i, b);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }

    Ordering::Equal
}

fn component(parts: &[&str], index: usize, original: &str) -> u64 {
    let Some(part) = parts.get(index) else {
        return 0;
    };
    part.trim().parse().unwrap_or_else(|_| {
        warn!("Could not parse component '{}' of version '{}'", part, original);
        0
    })
}
