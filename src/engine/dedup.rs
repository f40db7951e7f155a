//! Positional de-duplication of keyword matches.
//!
//! Matches are kept in discovery order; a later match is dropped when it
//! starts fewer than `OVERLAP_RADIUS` characters from an already kept one.
//! This is a proximity filter, not an identity filter: two different
//! keywords that start one or two characters apart collapse into whichever
//! was discovered first. Literal keys are discovered longest-first, so the
//! more specific term usually survives ("곤약밥" over the "밥" inside it).
//!
//! The same ordering works against a one-char carb followed by a two-char
//! negation word: in "면 없이" the "없이" is found first and "면", two chars
//! before it, is dropped. The negation still scores, but there is no carb
//! penalty left for it to cancel.
//!
//! The survivors are returned sorted by position.

use crate::KeywordMatch;

pub(crate) const OVERLAP_RADIUS: usize = 3;

pub(crate) fn dedup_by_position(found: Vec<KeywordMatch>) -> Vec<KeywordMatch> {
    let mut kept: Vec<KeywordMatch> = Vec::with_capacity(found.len());
    for candidate in found {
        let overlaps = kept.iter().any(|m| m.position.abs_diff(candidate.position) < OVERLAP_RADIUS);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|m| m.position);
    kept
}
