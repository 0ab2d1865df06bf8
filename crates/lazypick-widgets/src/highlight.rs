//! Case-insensitive search matching and match highlighting.
//!
//! The term is matched literally (no pattern syntax), one character at a
//! time with each side lowercased, so filtering and highlighting always agree
//! on what counts as a match.

use ratatui::style::Style;
use ratatui::text::Span;

/// A run of label text that either matches the search term or does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

fn chars_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Byte length of a match of `needle` starting at byte `start` of `haystack`.
fn match_len(haystack: &str, start: usize, needle: &[char]) -> Option<usize> {
    let mut rest = haystack[start..].char_indices();
    for &want in needle {
        let (_, got) = rest.next()?;
        if !chars_eq(got, want) {
            return None;
        }
    }
    Some(rest.next().map_or(haystack.len() - start, |(i, _)| i))
}

/// Whether `haystack` contains `needle`, ignoring case. An empty needle
/// matches everything.
pub fn contains(haystack: &str, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    needle.is_empty()
        || haystack
            .char_indices()
            .any(|(i, _)| match_len(haystack, i, &needle).is_some())
}

/// Split `text` into alternating unmatched and matched fragments.
///
/// Matches are found left to right and never overlap. Concatenating the
/// fragments gives back `text`. An empty term yields the whole text as one
/// unmatched fragment.
pub fn split<'a>(text: &'a str, term: &str) -> Vec<Fragment<'a>> {
    let needle: Vec<char> = term.chars().collect();
    let mut fragments = Vec::new();
    if needle.is_empty() {
        if !text.is_empty() {
            fragments.push(Fragment {
                text,
                matched: false,
            });
        }
        return fragments;
    }

    let mut plain_start = 0;
    let mut pos = 0;
    while pos < text.len() {
        match match_len(text, pos, &needle) {
            Some(len) => {
                if plain_start < pos {
                    fragments.push(Fragment {
                        text: &text[plain_start..pos],
                        matched: false,
                    });
                }
                fragments.push(Fragment {
                    text: &text[pos..pos + len],
                    matched: true,
                });
                pos += len;
                plain_start = pos;
            }
            None => {
                pos += text[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    if plain_start < text.len() {
        fragments.push(Fragment {
            text: &text[plain_start..],
            matched: false,
        });
    }
    fragments
}

/// Build spans for `text`, styling the fragments that match `term` with
/// `matched` on top of `base`.
pub fn spans<'a>(text: &'a str, term: &str, base: Style, matched: Style) -> Vec<Span<'a>> {
    split(text, term)
        .into_iter()
        .map(|f| {
            let style = if f.matched { base.patch(matched) } else { base };
            Span::styled(f.text, style)
        })
        .collect()
}
