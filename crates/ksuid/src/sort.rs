//! Ordering helpers for collections of [`Ksuid`]s.
//!
//! All comparisons are unsigned, big-endian, byte-wise over the 20-byte binary
//! form, which agrees with lexicographic comparison of the base62 text.

use core::cmp::Ordering;

use crate::Ksuid;

/// Compares two KSUIDs byte-wise.
///
/// `compare(a, b) as i8` yields `-1`, `0`, or `1`.
///
/// # Example
/// ```
/// use core::cmp::Ordering;
/// use ksuid::{Ksuid, sort};
///
/// assert_eq!(sort::compare(&Ksuid::NIL, &Ksuid::MAX), Ordering::Less);
/// assert_eq!(sort::compare(&Ksuid::MAX, &Ksuid::NIL) as i8, 1);
/// ```
#[must_use]
pub fn compare(a: &Ksuid, b: &Ksuid) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Returns `true` if no adjacent pair is out of order. Empty and single-element
/// slices are sorted.
#[must_use]
pub fn is_sorted(ids: &[Ksuid]) -> bool {
    ids.windows(2).all(|w| compare(&w[0], &w[1]) != Ordering::Greater)
}

/// Sorts `ids` in place in ascending order.
///
/// Equal KSUIDs are bit-identical, so the result is the same as a stable sort.
pub fn sort(ids: &mut [Ksuid]) {
    ids.sort_unstable_by(compare);
}

/// Stably sorts arbitrary records by the KSUID each one carries.
///
/// Records whose keys are equal keep their relative input order.
#[cfg(feature = "alloc")]
pub fn sort_by_ksuid<T>(items: &mut [T], mut key: impl FnMut(&T) -> Ksuid) {
    items.sort_by(|a, b| compare(&key(a), &key(b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PAYLOAD_LEN;

    fn id(ts: u32, fill: u8) -> Ksuid {
        Ksuid::from_components(ts, [fill; PAYLOAD_LEN])
    }

    #[test]
    fn compare_is_a_total_order() {
        assert_eq!(compare(&id(1, 0), &id(1, 0)), Ordering::Equal);
        assert_eq!(compare(&id(1, 0), &id(1, 1)), Ordering::Less);
        assert_eq!(compare(&id(2, 0), &id(1, 0xFF)), Ordering::Greater);
        assert_eq!(compare(&id(1, 0), &id(1, 1)) as i8, -1);
        assert_eq!(compare(&id(1, 1), &id(1, 1)) as i8, 0);
    }

    #[test]
    fn compare_agrees_with_text_order() {
        let ids = [id(0, 0), id(0, 9), id(7, 3), id(0x0100_0000, 0), Ksuid::MAX];
        for a in &ids {
            for b in &ids {
                assert_eq!(
                    compare(a, b),
                    a.encode().as_str().cmp(b.encode().as_str())
                );
            }
        }
    }

    #[test]
    fn short_slices_are_sorted() {
        assert!(is_sorted(&[]));
        assert!(is_sorted(&[Ksuid::MAX]));
        assert!(is_sorted(&[id(1, 1), id(1, 1)]));
        assert!(!is_sorted(&[id(2, 0), id(1, 0)]));
    }

    #[test]
    fn sort_orders_and_is_idempotent() {
        let mut ids = [id(5, 1), id(1, 9), Ksuid::MAX, id(5, 0), Ksuid::NIL, id(1, 9)];
        assert!(!is_sorted(&ids));

        sort(&mut ids);
        assert!(is_sorted(&ids));
        assert_eq!(ids[0], Ksuid::NIL);
        assert_eq!(ids[5], Ksuid::MAX);

        let once = ids;
        sort(&mut ids);
        assert_eq!(ids, once);
    }

    #[cfg(feature = "std")]
    #[test]
    fn sort_by_ksuid_is_stable() {
        let mut rows = vec![(id(3, 0), "a"), (id(1, 0), "b"), (id(3, 0), "c"), (id(1, 0), "d")];
        sort_by_ksuid(&mut rows, |row| row.0);
        let labels: Vec<_> = rows.iter().map(|row| row.1).collect();
        assert_eq!(labels, ["b", "d", "a", "c"]);
    }

    #[cfg(feature = "std")]
    #[test]
    fn sorting_generated_ids() {
        let mut ids: Vec<Ksuid> = (0..32)
            .map(|i| Ksuid::from_unix_parts(1_700_000_000 - i * 10, &[0xAB; PAYLOAD_LEN]).unwrap())
            .collect();
        assert!(!is_sorted(&ids));
        sort(&mut ids);
        assert!(is_sorted(&ids));
        assert!(ids.windows(2).all(|w| w[0].encode().as_str() <= w[1].encode().as_str()));
    }
}
