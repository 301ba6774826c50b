//! Property-based tests for duplicate naming
//!
//! Tests invariants:
//! - `<base> <n>` becomes `<base> <n+1>`
//! - `<base>#<n>` becomes `<base> #<n+1>`
//! - Anything without a trailing counter gets " 2"
//! - Output never has surrounding whitespace

use proptest::prelude::*;

use crate::core::session::increment_name;

/// Base names that do not themselves end in a digit or contain '#'.
fn arb_base() -> impl Strategy<Value = String> {
    "[A-Za-zÀ-ú][A-Za-zÀ-ú ]{0,15}[A-Za-zÀ-ú]"
}

proptest! {
    #[test]
    fn spaced_counter_increments(base in arb_base(), n in 0u64..1_000_000) {
        let name = format!("{base} {n}");
        prop_assert_eq!(increment_name(&name), format!("{base} {}", n + 1));
    }

    #[test]
    fn hash_counter_normalises_spacing(base in arb_base(), gap in " {0,3}", n in 0u64..1_000_000) {
        let name = format!("{base}{gap}#{n}");
        prop_assert_eq!(increment_name(&name), format!("{} #{}", base.trim_end(), n + 1));
    }

    #[test]
    fn plain_names_get_two(base in arb_base()) {
        prop_assert_eq!(increment_name(&base), format!("{} 2", base.trim()));
    }

    #[test]
    fn repeated_duplication_counts_up(base in arb_base(), times in 1usize..30) {
        let mut name = base.trim().to_string();
        for _ in 0..times {
            name = increment_name(&name);
        }
        prop_assert_eq!(name, format!("{} {}", base.trim(), times + 1));
    }

    #[test]
    fn output_is_trimmed(name in "\\PC{1,30}".prop_filter("blank", |s| !s.trim().is_empty())) {
        let next = increment_name(&name);
        prop_assert_eq!(next.trim(), next.as_str());
    }
}
