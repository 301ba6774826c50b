//! Name increment policy used when duplicating combatants.
//!
//! "Goblin" → "Goblin 2", "Goblin 2" → "Goblin 3", "Ogre #1" → "Ogre #2".
//! Pure string transformation: it knows nothing about the other names in the
//! roster, and the trailing counter has no numeric ceiling.

use std::sync::OnceLock;

use regex::Regex;

static SPACED_COUNTER: OnceLock<Regex> = OnceLock::new();
static HASH_COUNTER: OnceLock<Regex> = OnceLock::new();

fn spaced_counter() -> &'static Regex {
    SPACED_COUNTER.get_or_init(|| Regex::new(r"^(.*?)(\s+)([0-9]+)$").expect("static pattern"))
}

fn hash_counter() -> &'static Regex {
    HASH_COUNTER.get_or_init(|| Regex::new(r"^(.*?)#([0-9]+)$").expect("static pattern"))
}

/// Derive the name for a copy of `name`.
///
/// 1. `<base><whitespace><n>` keeps base and separator, increments `n`.
/// 2. `<base>#<n>` becomes `<base> #<n+1>` (single space before `#`).
/// 3. Anything else gets `" 2"` appended.
pub fn increment_name(name: &str) -> String {
    let trimmed = name.trim();

    if let Some(caps) = spaced_counter().captures(trimmed) {
        return format!("{}{}{}", &caps[1], &caps[2], increment_digits(&caps[3]));
    }

    if let Some(caps) = hash_counter().captures(trimmed) {
        let base = caps[1].trim();
        let next = increment_digits(&caps[2]);
        return if base.is_empty() {
            format!("#{next}")
        } else {
            format!("{base} #{next}")
        };
    }

    format!("{trimmed} 2")
}

/// Add one to a run of ASCII decimal digits, dropping leading zeros.
fn increment_digits(digits: &str) -> String {
    let significant = digits.trim_start_matches('0');
    let mut out: Vec<u8> = if significant.is_empty() {
        vec![b'0']
    } else {
        significant.bytes().collect()
    };

    let mut carry = true;
    for byte in out.iter_mut().rev() {
        if !carry {
            break;
        }
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            carry = false;
        }
    }
    if carry {
        out.insert(0, b'1');
    }

    // Only ASCII digits were ever written.
    String::from_utf8(out).unwrap_or_default()
}
