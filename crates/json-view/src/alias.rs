//! Wire-key resolution for declared field names.
//!
//! An explicit alias always wins. Otherwise the declared (underscore
//! separated) name is converted according to the view's [`KeyConvention`].
//! Camel-case conversions are interned process-wide, so every view type
//! declaring `user_id` shares one `Arc<str>` for `"userId"`.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// How undeclared-alias field names map onto document keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyConvention {
    /// `user_id` → `userId`.
    #[default]
    CamelCase,
    /// `user_id` → `user_id`.
    Verbatim,
}

fn camel_cache() -> &'static RwLock<FxHashMap<Box<str>, Arc<str>>> {
    static CACHE: OnceLock<RwLock<FxHashMap<Box<str>, Arc<str>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Resolves the wire key for `field_name`.
pub fn resolve(field_name: &str, alias: Option<&str>, convention: KeyConvention) -> Arc<str> {
    match (alias, convention) {
        (Some(alias), _) => Arc::from(alias),
        (None, KeyConvention::CamelCase) => to_camel_case(field_name),
        (None, KeyConvention::Verbatim) => Arc::from(field_name),
    }
}

/// Memoized `snake_case` → `camelCase` conversion.
pub fn to_camel_case(name: &str) -> Arc<str> {
    if let Some(hit) = camel_cache().read().get(name) {
        return Arc::clone(hit);
    }
    let converted: Arc<str> = Arc::from(convert(name));
    let mut cache = camel_cache().write();
    Arc::clone(cache.entry(Box::from(name)).or_insert(converted))
}

fn convert(name: &str) -> String {
    let mut parts = name.split('_');
    let mut out = String::with_capacity(name.len());
    if let Some(head) = parts.next() {
        out.push_str(head);
    }
    for part in parts {
        push_title(&mut out, part);
    }
    out
}

/// Title-cases one word: a cased letter following a non-letter is
/// uppercased, every other cased letter is lowercased (`"iD2x"` → `"Id2X"`).
fn push_title(out: &mut String, word: &str) {
    let mut prev_alpha = false;
    for ch in word.chars() {
        if prev_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_alpha = ch.is_alphabetic();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn camel_case_matrix() {
        let cases = [
            ("user_id", "userId"),
            ("user_name", "userName"),
            ("is_active", "isActive"),
            ("id", "id"),
            ("a_b_c", "aBC"),
            ("user_ID", "userId"),
            ("item2_x", "item2X"),
            ("page_2x", "page2X"),
            ("double__gap", "doubleGap"),
            ("trailing_", "trailing"),
            ("_leading", "Leading"),
            ("", ""),
        ];
        for (input, expected) in cases {
            assert_eq!(&*to_camel_case(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn explicit_alias_wins_over_convention() {
        assert_eq!(&*resolve("internal_id", Some("ID"), KeyConvention::CamelCase), "ID");
        assert_eq!(&*resolve("internal_id", Some("ID"), KeyConvention::Verbatim), "ID");
        assert_eq!(&*resolve("tags", Some("Tags-List-V1"), KeyConvention::CamelCase), "Tags-List-V1");
    }

    #[test]
    fn verbatim_keeps_declared_name() {
        assert_eq!(&*resolve("user_id", None, KeyConvention::Verbatim), "user_id");
    }

    #[test]
    fn repeated_conversion_returns_interned_key() {
        let a = to_camel_case("shared_field_name");
        let b = to_camel_case("shared_field_name");
        assert!(Arc::ptr_eq(&a, &b));
    }

    proptest! {
        #[test]
        fn conversion_is_deterministic_and_underscore_free(name in "[a-z][a-z0-9_]{0,24}") {
            let first = to_camel_case(&name);
            prop_assert_eq!(&first, &to_camel_case(&name));
            prop_assert!(!first.contains('_'));
        }
    }
}
