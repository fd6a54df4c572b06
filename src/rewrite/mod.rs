//! Boundary-aware, longest-match-first token substitution.
//!
//! A [`NeedleTable`] holds the needles of one lookup category (aliases,
//! scancode keys, operators, compatibility targets) sorted for matching.
//! Rewriting walks the needles in that order and replaces every occurrence
//! that stands as a whole token: delimited by whitespace, parentheses, `|`,
//! `&` or the ends of the text.
//!
//! Text inserted by a replacement is frozen for the rest of the pass, so a
//! short needle can never match inside a longer needle's replacement, and a
//! second pass over the output with the same table finds nothing to do.

mod cache;

pub use cache::NeedleCache;

use crate::model::{IdentificationEvent, IdentificationMethod};
use std::collections::BTreeMap;

/// Lookup category a needle table is compiled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeedleCategory {
    Aliases,
    ScancodeKeys,
    /// Ambiguity trigger aliases; only scanned, never rewritten
    Ambiguities,
    Operators,
    Compatibility,
}

impl NeedleCategory {
    /// Tag recorded on identification events from this category
    #[must_use]
    pub const fn method(self) -> IdentificationMethod {
        match self {
            Self::Aliases | Self::Ambiguities => IdentificationMethod::Alias,
            Self::ScancodeKeys => IdentificationMethod::ScancodeKey,
            Self::Operators => IdentificationMethod::Operator,
            Self::Compatibility => IdentificationMethod::Compat,
        }
    }

    /// Operators like `||` may touch a license name directly (`MIT||BSD`)
    #[must_use]
    pub const fn allows_alphanumeric_boundary(self) -> bool {
        matches!(self, Self::Operators)
    }
}

/// Result of one rewrite pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// One event per needle that matched, in matching order
    pub identifications: Vec<IdentificationEvent>,
}

/// Needles of one category, sorted longest first.
#[derive(Debug, Clone)]
pub struct NeedleTable {
    needles: Vec<(String, String)>,
    method: IdentificationMethod,
    allow_alphanumeric: bool,
}

impl NeedleTable {
    /// Sort the needles of `map` for matching.
    ///
    /// Longer needles come first; equal lengths fall back to reverse
    /// lexicographic order. Empty needles are dropped, and so are needles
    /// that map to themselves unless the table is only scanned.
    #[must_use]
    pub fn compile(map: &BTreeMap<String, String>, category: NeedleCategory) -> Self {
        let keep_identity = category == NeedleCategory::Ambiguities;
        let mut needles: Vec<(String, String)> = map
            .iter()
            .filter(|(needle, replacement)| {
                !needle.is_empty() && (keep_identity || needle != replacement)
            })
            .map(|(needle, replacement)| (needle.clone(), replacement.clone()))
            .collect();
        needles.sort_by(|(a, _), (b, _)| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| b.cmp(a))
        });

        Self {
            needles,
            method: category.method(),
            allow_alphanumeric: category.allows_alphanumeric_boundary(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.needles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.needles.is_empty()
    }

    /// Needles in matching order
    pub fn needles(&self) -> impl Iterator<Item = &str> {
        self.needles.iter().map(|(needle, _)| needle.as_str())
    }

    /// Replace every whole-token needle occurrence in `text`.
    #[must_use]
    pub fn rewrite(&self, text: &str) -> Rewrite {
        let (text, matched) = self.run(text);
        let identifications = matched
            .into_iter()
            .map(|idx| {
                let (needle, replacement) = &self.needles[idx];
                IdentificationEvent::new(needle.as_str(), replacement.as_str(), self.method)
            })
            .collect();
        Rewrite {
            text,
            identifications,
        }
    }

    /// Needle/value pairs that occur in `text`, in matching order.
    ///
    /// Occurrences overlapping a longer needle's match are not reported.
    #[must_use]
    pub fn matches(&self, text: &str) -> Vec<(&str, &str)> {
        self.run(text)
            .1
            .into_iter()
            .map(|idx| {
                let (needle, value) = &self.needles[idx];
                (needle.as_str(), value.as_str())
            })
            .collect()
    }

    fn run(&self, text: &str) -> (String, Vec<usize>) {
        let mut pieces = vec![Piece::open(text)];
        let mut matched = Vec::new();

        for (idx, (needle, replacement)) in self.needles.iter().enumerate() {
            let mut found = false;
            let mut next = Vec::with_capacity(pieces.len());
            for piece in pieces {
                if piece.frozen {
                    next.push(piece);
                    continue;
                }
                let spans = find_tokens(&piece.text, needle, self.allow_alphanumeric);
                if spans.is_empty() {
                    next.push(piece);
                    continue;
                }
                found = true;
                let mut cursor = 0;
                for start in spans {
                    if start > cursor {
                        next.push(Piece::open(&piece.text[cursor..start]));
                    }
                    next.push(Piece::frozen(format!(" {replacement} ")));
                    cursor = start + needle.len();
                }
                if cursor < piece.text.len() {
                    next.push(Piece::open(&piece.text[cursor..]));
                }
            }
            pieces = next;
            if found {
                matched.push(idx);
            }
        }

        let joined: String = pieces.iter().map(|piece| piece.text.as_str()).collect();
        (collapse_whitespace(&joined), matched)
    }
}

/// A run of text, frozen once it was produced by a replacement.
///
/// Frozen pieces start and end with a space, so the edges of every open
/// piece are token boundaries.
#[derive(Debug)]
struct Piece {
    text: String,
    frozen: bool,
}

impl Piece {
    fn open(text: &str) -> Self {
        Self {
            text: text.to_string(),
            frozen: false,
        }
    }

    fn frozen(text: String) -> Self {
        Self { text, frozen: true }
    }
}

/// Characters that delimit tokens
#[must_use]
pub fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '|' | '&')
}

/// Whether `neighbor` (None at the ends of the text) bounds a needle whose
/// character on that side is `edge`.
fn is_boundary(neighbor: Option<char>, edge: char, allow_alphanumeric: bool) -> bool {
    match neighbor {
        None => true,
        Some(c) if is_delimiter(c) => true,
        Some(c) => allow_alphanumeric && c.is_alphanumeric() && !edge.is_alphanumeric(),
    }
}

/// Byte offsets of non-overlapping, boundary-delimited occurrences.
fn find_tokens(text: &str, needle: &str, allow_alphanumeric: bool) -> Vec<usize> {
    let (Some(first), Some(last)) = (needle.chars().next(), needle.chars().last()) else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(offset) = text[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();

        if is_boundary(before, first, allow_alphanumeric)
            && is_boundary(after, last, allow_alphanumeric)
        {
            spans.push(start);
            from = end;
        } else {
            // retry one character further, the next occurrence may overlap
            from = start + first.len_utf8();
        }
        if from >= text.len() {
            break;
        }
    }
    spans
}

/// Collapse whitespace runs to a single space and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)], category: NeedleCategory) -> NeedleTable {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        NeedleTable::compile(&map, category)
    }

    fn aliases() -> NeedleTable {
        table(
            &[
                ("BSD3", "BSD-3-Clause"),
                ("GPLv2", "GPL-2.0-only"),
                ("GPLv2+", "GPL-2.0-or-later"),
                ("Apache 2.0", "Apache-2.0"),
                ("Apache 2.0 with LLVM exception", "Apache-2.0 WITH LLVM-exception"),
            ],
            NeedleCategory::Aliases,
        )
    }

    fn operators() -> NeedleTable {
        table(
            &[
                ("&", "AND"),
                ("&&", "AND"),
                ("and", "AND"),
                ("|", "OR"),
                ("||", "OR"),
                ("or", "OR"),
            ],
            NeedleCategory::Operators,
        )
    }

    #[test]
    fn test_longest_needle_wins() {
        let result = aliases().rewrite("GPLv2+ OR Apache 2.0 with LLVM exception");
        assert_eq!(
            result.text,
            "GPL-2.0-or-later OR Apache-2.0 WITH LLVM-exception"
        );
        let queried: Vec<&str> = result
            .identifications
            .iter()
            .map(|e| e.queried_name.as_str())
            .collect();
        assert_eq!(queried, vec!["Apache 2.0 with LLVM exception", "GPLv2+"]);
    }

    #[test]
    fn test_sort_order_ties_reverse_lexicographic() {
        let t = table(
            &[("ab", "x"), ("abc", "y"), ("ac", "z"), ("b", "w")],
            NeedleCategory::Aliases,
        );
        assert_eq!(t.needles().collect::<Vec<_>>(), vec!["abc", "ac", "ab", "b"]);
    }

    #[test]
    fn test_events_follow_needle_order_not_position() {
        let result = aliases().rewrite("BSD3 AND GPLv2+");
        let queried: Vec<&str> = result
            .identifications
            .iter()
            .map(|e| e.queried_name.as_str())
            .collect();
        assert_eq!(queried, vec!["GPLv2+", "BSD3"]);
        assert!(result
            .identifications
            .iter()
            .all(|e| e.identified_via == IdentificationMethod::Alias));
    }

    #[test]
    fn test_token_boundaries() {
        let t = aliases();
        assert_eq!(t.rewrite("BSD3").text, "BSD-3-Clause");
        assert_eq!(t.rewrite("(BSD3)").text, "( BSD-3-Clause )");
        assert_eq!(t.rewrite("MIT|BSD3&X").text, "MIT| BSD-3-Clause &X");
        // embedded in a longer word: untouched
        assert_eq!(t.rewrite("BSD3x").text, "BSD3x");
        assert_eq!(t.rewrite("xBSD3").text, "xBSD3");
        assert_eq!(t.rewrite("BSD3-Clause").text, "BSD3-Clause");
        assert!(t.rewrite("BSD3x").identifications.is_empty());
    }

    #[test]
    fn test_adjacent_occurrences_share_a_delimiter() {
        assert_eq!(aliases().rewrite("BSD3 BSD3").text, "BSD-3-Clause BSD-3-Clause");
    }

    #[test]
    fn test_operators_may_touch_names() {
        let t = operators();
        assert_eq!(t.rewrite("MIT||BSD").text, "MIT OR BSD");
        assert_eq!(t.rewrite("MIT & BSD").text, "MIT AND BSD");
        assert_eq!(t.rewrite("MIT and BSD or X").text, "MIT AND BSD OR X");
        // a letter bounds a symbol operator on either side
        assert_eq!(t.rewrite("AT&T").text, "AT AND T");
        // word operators still need real boundaries
        assert_eq!(t.rewrite("Standard").text, "Standard");
        assert_eq!(t.rewrite("GPL-2.0-or-later").text, "GPL-2.0-or-later");
    }

    #[test]
    fn test_operators_longest_first() {
        let result = operators().rewrite("A && B || C");
        assert_eq!(result.text, "A AND B OR C");
        let queried: Vec<&str> = result
            .identifications
            .iter()
            .map(|e| e.queried_name.as_str())
            .collect();
        assert_eq!(queried, vec!["||", "&&"]);
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let t = aliases();
        let first = t.rewrite("GPLv2+ or  BSD3 and (GPLv2)");
        assert_eq!(first.identifications.len(), 3);
        let second = t.rewrite(&first.text);
        assert_eq!(second.text, first.text);
        assert!(second.identifications.is_empty());

        let ops = operators();
        let first = ops.rewrite(&first.text);
        let second = ops.rewrite(&first.text);
        assert_eq!(second.text, first.text);
        assert!(second.identifications.is_empty());
    }

    #[test]
    fn test_identity_needles_are_skipped() {
        let t = table(&[("AND", "AND"), ("and", "AND")], NeedleCategory::Operators);
        assert_eq!(t.len(), 1);
        assert!(t.rewrite("A AND B").identifications.is_empty());
    }

    #[test]
    fn test_matches_masks_overlaps() {
        let t = table(
            &[("GNU", "GNU"), ("GNU license", "GNU"), ("GPL", "GPL")],
            NeedleCategory::Ambiguities,
        );
        assert_eq!(t.matches("GNU license OR GPL"), vec![("GNU license", "GNU"), ("GPL", "GPL")]);
        assert_eq!(t.matches("GNU license OR GNU"), vec![("GNU license", "GNU"), ("GNU", "GNU")]);
        assert!(t.matches("GNUstep").is_empty());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_empty_text() {
        let result = aliases().rewrite("");
        assert_eq!(result.text, "");
        assert!(result.identifications.is_empty());
    }
}
