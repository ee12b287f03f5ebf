//! Remix title parsing.
//!
//! SoundCloud has no structured "remix of" metadata, so the original artist,
//! original song and remix artist have to be recovered from freeform title
//! text. This is the weakest link of the whole pipeline: the parser is a
//! best-effort heuristic that silently yields partial results for ambiguous
//! or malformed titles, never an error.
//!
//! Handled patterns:
//!
//! ```text
//! Artist - Song Title (RemixArtist Remix)
//! Artist - Song Title [RemixArtist Edit]
//! Remixer - Song Title (Original Cover Remix)
//! Song Title (RemixArtist Bootleg)
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::ParsedTitle;

lazy_static! {
    static ref REMIX_PAREN: Regex =
        Regex::new(r"(?i)\s*\(([^)]+?)\s+(?:remix|edit|bootleg|flip|rework|vip|mix)\)").unwrap();
    static ref REMIX_BRACKET: Regex =
        Regex::new(r"(?i)\s*\[([^\]]+?)\s+(?:remix|edit|bootleg|flip|rework|vip|mix)\]").unwrap();
    static ref COVER_WORD: Regex = Regex::new(r"(?i)\bcover\b").unwrap();
    static ref COVER_STRIP: Regex = Regex::new(r"(?i)\s+cover\b.*$").unwrap();
    static ref TRAILING_REMIX: Regex =
        Regex::new(r"(?i)\s*[-\u{2013}]\s*(?:remix|edit|bootleg|flip|rework)$").unwrap();
}

/// Separators between artist and song, checked in priority order; the first
/// match wins.
const SEPARATORS: [&str; 3] = [" - ", " \u{2013} ", " \u{2014} "];

/// Decompose a free-text remix title into (original artist, original song,
/// remix artist). Any field may come back `None`.
pub fn parse_remix_title(title: &str) -> ParsedTitle {
    let mut result = ParsedTitle {
        raw_title: title.to_string(),
        ..Default::default()
    };

    // Extract the parenthetical/bracketed remixer name. A "cover remix"
    // names the original artist instead: in "(Weeknd Cover Remix)" the
    // captured name is the one being covered, and the remixer sits before
    // the separator.
    let captured = REMIX_PAREN
        .captures(title)
        .or_else(|| REMIX_BRACKET.captures(title));
    let mut is_cover = false;
    if let Some(caps) = captured {
        let inner = caps[1].trim();
        if COVER_WORD.is_match(inner) {
            is_cover = true;
            let cover_name = COVER_STRIP.replace(inner, "").trim().to_string();
            if !cover_name.is_empty() {
                result.original_artist = Some(cover_name);
            }
        } else {
            result.remix_artist = Some(inner.to_string());
        }
    }

    // Strip the remix suffixes to isolate the core "Artist - Song" string.
    let clean = REMIX_PAREN.replace_all(title, "");
    let clean = REMIX_BRACKET.replace_all(&clean, "");
    let clean = clean.trim();
    let clean = TRAILING_REMIX.replace(clean, "");
    let clean = clean.trim();

    for sep in SEPARATORS {
        if let Some((left, right)) = clean.split_once(sep) {
            let left = left.trim();
            if !left.is_empty() {
                if is_cover {
                    result.remix_artist = Some(left.to_string());
                } else {
                    result.original_artist = Some(left.to_string());
                }
            }
            let right = right.trim();
            if !right.is_empty() {
                result.original_song = Some(right.to_string());
            }
            return result;
        }
    }

    if !clean.is_empty() {
        result.original_song = Some(clean.to_string());
    }
    result
}
