//! Finder-style "natural" string ordering.
//!
//! Letters compare case-insensitively and runs of ASCII digits compare by
//! numeric value, so `note2.md` sorts before `note10.md`. Strings that are
//! equal under those rules fall back to plain ordinal comparison so the
//! result is a total order.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compares two strings in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    // Leading-zero differences only decide when everything else is equal
    let mut zeros = Ordering::Equal;

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return zeros.then_with(|| a.cmp(b)),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) if lc.is_ascii_digit() && rc.is_ascii_digit() => {
                let ln = take_digits(&mut left);
                let rn = take_digits(&mut right);
                let ord = compare_digit_values(&ln, &rn);
                if ord != Ordering::Equal {
                    return ord;
                }
                if zeros == Ordering::Equal {
                    // "7" before "07": fewer leading zeros first
                    zeros = ln.len().cmp(&rn.len());
                }
            }
            (Some(lc), Some(rc)) => {
                let ord = lc.to_lowercase().cmp(rc.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Compares two digit runs by value without parsing (runs may exceed u64).
fn compare_digit_values(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
