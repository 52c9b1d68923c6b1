//! Prefix glob matching for device paths
//!
//! `*` consumes characters until the next `/`, the end of the string, or
//! the character that follows the `*` in the pattern.

/// If `s` starts with `glob`, return the unmatched tail of `s`.
///
/// The match must end on a segment boundary: the tail is either empty or
/// starts with `/`.
pub fn glob_prefix<'a>(glob: &str, s: &'a str) -> Option<&'a str> {
    let g = glob.as_bytes();
    let b = s.as_bytes();
    let (mut gi, mut si) = (0, 0);

    loop {
        let gc = g.get(gi).copied();
        let sc = b.get(si).copied();

        match gc {
            None if sc.is_none() || sc == Some(b'/') => return s.get(si..),
            Some(b'*') => {
                if sc.is_none() || sc == Some(b'/') || sc == g.get(gi + 1).copied() {
                    gi += 1;
                } else {
                    si += 1;
                }
            }
            _ => {
                if gc != sc {
                    return None;
                }
                gi += 1;
                si += 1;
            }
        }
    }
}

/// Glob match in either direction; either side may carry the wildcard
pub fn glob_match(a: &str, b: &str) -> bool {
    glob_prefix(a, b).is_some() || glob_prefix(b, a).is_some()
}
