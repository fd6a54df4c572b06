//! Expansion of "-or-later" licenses into explicit OR groups.
//!
//! `GPL-2.0-or-later WITH GCC-exception-2.0` becomes
//! `(GPL-2.0-only WITH GCC-exception-2.0 OR GPL-3.0-only WITH GCC-exception-2.0)`.
//! Only the dual token is touched; delimiters, the order of fragments and
//! the original parentheses all survive.

use crate::definitions::DefinitionTables;
use crate::model::{DualExpansionEvent, IdentificationEvent, IdentificationMethod};

const DELIMITERS: [&str; 4] = [" AND ", " OR ", "(", ")"];

/// Operators that delimit a fragment at either end of the text
const EDGE_OPERATORS: [&str; 2] = ["AND", "OR"];

/// Result of an expansion pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DualExpansion {
    pub text: String,
    pub expansions: Vec<DualExpansionEvent>,
    pub identifications: Vec<IdentificationEvent>,
}

/// Expand every fragment whose leading token has a dual-license entry.
pub fn expand(expression: &str, tables: &DefinitionTables) -> DualExpansion {
    let mut out = DualExpansion::default();

    for segment in split(expression) {
        let fragment = match segment {
            Segment::Delimiter(delimiter) => {
                out.text.push_str(delimiter);
                continue;
            }
            Segment::Fragment(fragment) => fragment,
        };

        let core = fragment.trim();
        let leading = core.split_whitespace().next().unwrap_or_default();
        let Some(entry) = tables.dual(leading) else {
            out.text.push_str(fragment);
            continue;
        };

        let rest = &core[leading.len()..];
        if !is_exception_tail(rest) {
            out.text.push_str(fragment);
            continue;
        }
        let variants: Vec<String> = entry
            .newer_versions
            .iter()
            .map(|version| format!("{version}{rest}"))
            .collect();
        let expanded = format!("({})", variants.join(" OR "));

        let lead_ws = &fragment[..fragment.len() - fragment.trim_start().len()];
        let trail_ws = &fragment[fragment.trim_end().len()..];
        out.text.push_str(lead_ws);
        out.text.push_str(&expanded);
        out.text.push_str(trail_ws);

        tracing::debug!("Expanded dual license \"{}\" to \"{}\"", core, expanded);
        out.identifications.push(IdentificationEvent::new(
            entry.id.as_str(),
            expanded.as_str(),
            IdentificationMethod::Dual,
        ));
        out.expansions.push(DualExpansionEvent {
            original: core.to_string(),
            dual_license: entry.id.clone(),
            newer_versions: entry.newer_versions.clone(),
            expanded,
        });
    }

    out
}

/// Whether `rest` is empty or a single `WITH <exception>` clause, the only
/// text copied into each expanded variant.
fn is_exception_tail(rest: &str) -> bool {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (None, _, _) => true,
        (Some(with), Some(_), None) => with == "WITH",
        _ => false,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Fragment(&'a str),
    Delimiter(&'a str),
}

/// Split on the delimiters, keeping them. Operators only split when bounded
/// by spaces or by an end of the text, so `FOR` or `ANDROID` stay inside
/// their fragment.
fn split(expression: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut fragment_start = 0;
    let mut pos = 0;

    while pos < expression.len() {
        if let Some(len) = delimiter_len(expression, pos) {
            if pos > fragment_start {
                segments.push(Segment::Fragment(&expression[fragment_start..pos]));
            }
            segments.push(Segment::Delimiter(&expression[pos..pos + len]));
            pos += len;
            fragment_start = pos;
        } else {
            let rest = &expression[pos..];
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    if fragment_start < expression.len() {
        segments.push(Segment::Fragment(&expression[fragment_start..]));
    }
    segments
}

/// Length of the delimiter starting at `pos`, if any.
fn delimiter_len(expression: &str, pos: usize) -> Option<usize> {
    let rest = &expression[pos..];
    if let Some(delimiter) = DELIMITERS.iter().find(|d| rest.starts_with(**d)) {
        return Some(delimiter.len());
    }
    EDGE_OPERATORS.iter().find_map(|op| {
        // " OR" closing the text
        if rest.len() == op.len() + 1 && rest.starts_with(' ') && rest.ends_with(op) {
            return Some(rest.len());
        }
        // "OR " opening the text
        let opening = pos == 0
            && rest.starts_with(op)
            && rest[op.len()..].starts_with(' ');
        opening.then_some(op.len() + 1)
    })
}
