//! Package-manager style version comparison.
//!
//! Versions are split into `[epoch:]version[-revision]`. The epoch is
//! compared numerically, the other two parts alternate between non-digit and
//! digit runs. A `~` sorts before everything, including the end of the
//! string, so `1.0~rc1` is older than `1.0`.

use std::cmp::Ordering;

/// Modifiers for [`compare_versions`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VercmpFlags {
    pub ignore_epoch: bool,
}

impl VercmpFlags {
    pub const NONE: Self = Self {
        ignore_epoch: false,
    };
    pub const IGNORE_EPOCH: Self = Self { ignore_epoch: true };
}

/// Borrowed view of the three parts of a version string.
#[derive(Debug, PartialEq, Eq)]
struct VersionParts<'a> {
    epoch: &'a [u8],
    version: &'a [u8],
    revision: &'a [u8],
}

impl<'a> VersionParts<'a> {
    fn split(v: &'a str) -> Self {
        let bytes = v.as_bytes();
        let (epoch, rest) = match bytes.iter().position(|&c| c == b':') {
            Some(idx) => (&bytes[..idx], &bytes[idx + 1..]),
            None => (&bytes[..0], bytes),
        };

        // The revision separator is only searched after the epoch, so a `-`
        // inside the epoch never produces an inverted range.
        let (version, revision) = match rest.iter().rposition(|&c| c == b'-') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, &b"0"[..]),
        };

        Self {
            epoch,
            version,
            revision,
        }
    }
}

fn is_digit(c: Option<u8>) -> bool {
    c.is_some_and(|c| c.is_ascii_digit())
}

fn is_alpha(c: Option<u8>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphabetic())
}

fn skip_zeros(s: &[u8]) -> &[u8] {
    let zeros = s.iter().take_while(|&&c| c == b'0').count();
    &s[zeros..]
}

/// Compares the digit runs at the start of `a` and `b`.
///
/// Returns the ordering plus whatever follows each digit run.
fn cmp_number<'a, 'b>(a: &'a [u8], b: &'b [u8]) -> (Ordering, &'a [u8], &'b [u8]) {
    let mut a = skip_zeros(a);
    let mut b = skip_zeros(b);
    let mut res = Ordering::Equal;

    while let (Some(&x), Some(&y)) = (a.first(), b.first()) {
        if !x.is_ascii_digit() || !y.is_ascii_digit() {
            break;
        }
        if res == Ordering::Equal {
            res = x.cmp(&y);
        }
        a = &a[1..];
        b = &b[1..];
    }

    // A longer digit run always wins, whatever the first difference was.
    match (is_digit(a.first().copied()), is_digit(b.first().copied())) {
        (true, false) => res = Ordering::Greater,
        (false, true) => res = Ordering::Less,
        _ => {}
    }

    (res, a, b)
}

fn cmp_part(mut a: &[u8], mut b: &[u8]) -> Ordering {
    while !a.is_empty() || !b.is_empty() {
        loop {
            let ca = a.first().copied();
            let cb = b.first().copied();
            if is_digit(ca) && is_digit(cb) {
                break;
            }

            match (ca, cb) {
                (None, None) => return Ordering::Equal,
                (Some(x), Some(y)) if x == y => {
                    a = &a[1..];
                    b = &b[1..];
                }
                _ if ca == Some(b'~') || cb == Some(b'~') => {
                    return if ca == Some(b'~') {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    };
                }
                (None, Some(b'0')) | (Some(b'0'), None) => return cmp_number(a, b).0,
                (None, _) => return Ordering::Less,
                (_, None) => return Ordering::Greater,
                (Some(x), Some(y)) => {
                    if is_digit(ca) != is_digit(cb) {
                        return if is_digit(ca) {
                            Ordering::Less
                        } else {
                            Ordering::Greater
                        };
                    }
                    if is_alpha(ca) != is_alpha(cb) {
                        return if is_alpha(ca) {
                            Ordering::Less
                        } else {
                            Ordering::Greater
                        };
                    }
                    return x.cmp(&y);
                }
            }
        }

        let (res, rest_a, rest_b) = cmp_number(a, b);
        if res != Ordering::Equal || (rest_a.is_empty() && rest_b.is_empty()) {
            return res;
        }
        a = rest_a;
        b = rest_b;
    }

    Ordering::Equal
}

/// Compares two optional version strings.
///
/// An absent version sorts before any present one; two absent versions are
/// equal. The comparison is total and never fails.
pub fn compare_versions(a: Option<&str>, b: Option<&str>, flags: VercmpFlags) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };

    if !flags.ignore_epoch {
        let (ab, bb) = (a.as_bytes(), b.as_bytes());
        if ab.len() >= 2 && bb.len() >= 2 && ab[0] != bb[0] && ab[1] == b':' && bb[1] == b':' {
            return ab[0].cmp(&bb[0]);
        }
    }

    if a == b {
        return Ordering::Equal;
    }

    let va = VersionParts::split(a);
    let vb = VersionParts::split(b);

    if !flags.ignore_epoch {
        let res = cmp_number(va.epoch, vb.epoch).0;
        if res != Ordering::Equal {
            return res;
        }
    }

    cmp_part(va.version, vb.version).then_with(|| cmp_part(va.revision, vb.revision))
}

/// Compares two version strings without any flags.
pub fn vercmp(a: &str, b: &str) -> Ordering {
    compare_versions(Some(a), Some(b), VercmpFlags::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_order(a: &str, b: &str, expected: Ordering) {
        assert_eq!(vercmp(a, b), expected, "{a} vs {b}");
        assert_eq!(vercmp(b, a), expected.reverse(), "{b} vs {a}");
    }

    #[test]
    fn test_split_parts() {
        let parts = VersionParts::split("2:1.4.1-3ubuntu1");
        assert_eq!(parts.epoch, b"2");
        assert_eq!(parts.version, b"1.4.1");
        assert_eq!(parts.revision, b"3ubuntu1");

        let parts = VersionParts::split("1.0");
        assert_eq!(parts.epoch, b"");
        assert_eq!(parts.version, b"1.0");
        assert_eq!(parts.revision, b"0");

        let parts = VersionParts::split("1-2:3");
        assert_eq!(parts.epoch, b"1-2");
        assert_eq!(parts.version, b"3");
        assert_eq!(parts.revision, b"0");
    }

    #[test]
    fn test_basic_ordering() {
        assert_order("6", "8", Ordering::Less);
        assert_order("0.6.12b-d", "0.6.12a", Ordering::Greater);
        assert_order("7.4", "7.4", Ordering::Equal);
        assert_order("ab.d", "ab.f", Ordering::Less);
        assert_order("0.6.16", "0.6.14", Ordering::Greater);
        assert_order("5.9.1+dfsg-5pureos1", "5.9.1+dfsg-5", Ordering::Greater);
        assert_order("2.79", "2.79a", Ordering::Less);
        assert_order("3.0.rc2", "3.0.0", Ordering::Greater);
        assert_order("3.0.0~rc2", "3.0.0", Ordering::Less);
        assert_order("11.0.9.1+1-0ubuntu1", "11.0.9+11-0ubuntu2", Ordering::Greater);
        assert_order("001.002.003", "001.002.003", Ordering::Equal);
    }

    #[test]
    fn test_numeric_runs() {
        assert_order("1.2.3", "1.2.4", Ordering::Less);
        assert_order("001.002.000", "001.002.009", Ordering::Less);
        assert_order("1.2.3", "1.2.3.1", Ordering::Less);
        assert_order("0.9", "1", Ordering::Less);
        assert_order("9.5", "10", Ordering::Less);
        assert_order("1.01", "1.1", Ordering::Equal);
    }

    #[test]
    fn test_alpha_runs() {
        assert_order("1.2.3a", "1.2.3b", Ordering::Less);
        assert_order("1.2.3", "1.2.3a", Ordering::Less);
        assert_order("alpha", "beta", Ordering::Less);
        assert_order("1.2a.3", "1.2b.3", Ordering::Less);
        assert_order("9", "9a", Ordering::Less);
        assert_order("9a", "10", Ordering::Less);
        assert_order("9+", "10", Ordering::Less);
        assert_order("9half", "10", Ordering::Less);
    }

    #[test]
    fn test_tilde() {
        assert_order("1.2.3~rc1", "1.2.3", Ordering::Less);
        assert_order("1.2.3~rc2", "1.2.3~rc1", Ordering::Greater);
        assert_order("1.0~~", "1.0~", Ordering::Less);
    }

    #[test]
    fn test_epochs() {
        assert_order("4:5.6-2", "8.0-6", Ordering::Greater);
        assert_order("1:1.0-4", "3:0.8-2", Ordering::Less);
        assert_order("10:1.0", "9:2.0", Ordering::Greater);

        assert_eq!(
            compare_versions(Some("1:1.0-4"), Some("3:0.8-2"), VercmpFlags::IGNORE_EPOCH),
            Ordering::Greater
        );
    }

    #[test]
    fn test_absent_versions() {
        assert_eq!(compare_versions(None, None, VercmpFlags::NONE), Ordering::Equal);
        assert_eq!(compare_versions(None, Some("4.0"), VercmpFlags::NONE), Ordering::Less);
        assert_eq!(compare_versions(Some("4.0"), None, VercmpFlags::NONE), Ordering::Greater);
    }

    #[test]
    fn test_empty_strings() {
        assert_order("", "", Ordering::Equal);
        assert_order("", "1", Ordering::Less);
        assert_order("", "~", Ordering::Greater);
    }

    #[test]
    fn test_single_tokens() {
        assert_order("C", "C", Ordering::Equal);
        assert_order("10", "9", Ordering::Greater);
    }

    #[test]
    fn test_epoch_shortcut_matches_plain_numbers() {
        assert_eq!(vercmp("1:0", "2:0"), vercmp("1", "2"));
        assert_eq!(vercmp("8:1.0", "3:9.0"), vercmp("8", "3"));
        assert_eq!(
            compare_versions(Some("1:1.0"), Some("2:1.0"), VercmpFlags::IGNORE_EPOCH),
            Ordering::Equal
        );
    }

    #[test]
    fn test_reflexive_and_antisymmetric() {
        let versions = [
            "", "~", "~~", "0", "00", "1", "1a0", ":", "-", "1-2:3", "1:", "1.0", "1.0~rc1",
            "1.0-1", "2:0.1", "a", "9half", "10",
        ];

        for a in versions {
            assert_eq!(vercmp(a, a), Ordering::Equal, "{a:?} vs itself");
            for b in versions {
                assert_eq!(vercmp(a, b), vercmp(b, a).reverse(), "{a:?} vs {b:?}");
            }
        }
    }
}
