//! Ordering of raw class lists.
//!
//! Classes that compile carry a `u64` sort key (variant weight in the high
//! bits, utility registration order in the low bits, see `compile`).
//! Classes that do not compile carry no key and sort before everything
//! keyed, keeping their first-seen order, so unknown classes never move
//! relative to each other and never interleave with generated rules.

/// Stable in-place ordering: unkeyed entries first in input order, then
/// keyed entries ascending.
pub fn sort_class_list(classes: &mut [(String, Option<u64>)]) {
    classes.sort_by_key(|(_, key)| *key);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(pairs: &[(&str, Option<u64>)]) -> Vec<(String, Option<u64>)> {
        pairs.iter().map(|(name, key)| (name.to_string(), *key)).collect()
    }

    fn names(classes: &[(String, Option<u64>)]) -> Vec<&str> {
        classes.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn unkeyed_sort_first_in_input_order() {
        let mut classes = keyed(&[
            ("keyed-b", Some(2)),
            ("mystery-1", None),
            ("keyed-a", Some(1)),
            ("mystery-2", None),
        ]);
        sort_class_list(&mut classes);
        assert_eq!(names(&classes), ["mystery-1", "mystery-2", "keyed-a", "keyed-b"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let mut classes = keyed(&[("first", Some(7)), ("second", Some(7)), ("third", Some(3))]);
        sort_class_list(&mut classes);
        assert_eq!(names(&classes), ["third", "first", "second"]);
    }
}
