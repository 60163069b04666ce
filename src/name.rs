//! Display-name normalization and cache/remote filename derivation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STRIP_CHARS: Regex = Regex::new(r"[-'\s]").unwrap();
    static ref HYPHEN_RUNS: Regex = Regex::new(r"['\s]+").unwrap();
    static ref SPACE_RUNS: Regex = Regex::new(r"\s+").unwrap();
}

/// Canonical comparison key for a display name: lowercased, with hyphens,
/// apostrophes and whitespace removed. Also the cache filename stem.
pub fn normalize(name: &str) -> String {
    STRIP_CHARS
        .replace_all(&name.to_lowercase(), "")
        .into_owned()
}

/// Remote audio filename forms, in the order they should be tried.
///
/// The upstream site is inconsistent about how it derives mp3 filenames from
/// display names, so both historical forms are produced: first with every
/// apostrophe-or-whitespace run collapsed to a hyphen, then with apostrophes
/// dropped before hyphenating whitespace. Identical forms are deduplicated,
/// so names without apostrophes yield a single candidate.
pub fn audio_file_candidates(name: &str) -> Vec<String> {
    let hyphenated = format!("{}.mp3", HYPHEN_RUNS.replace_all(name, "-"));
    let stripped = format!(
        "{}.mp3",
        SPACE_RUNS.replace_all(&name.replace('\'', ""), "-")
    );

    let mut candidates = vec![hyphenated];
    if stripped != candidates[0] {
        candidates.push(stripped);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize("Bald Eagle"), "baldeagle");
        assert_eq!(normalize("bald-eagle"), "baldeagle");
        assert_eq!(normalize("Cooper's Hawk"), "coopershawk");
        assert_eq!(normalize("  Great   Horned Owl "), "greathornedowl");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["Bald Eagle", "Cooper's Hawk", "x", ""] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_candidates_for_plain_name() {
        // Without apostrophes both derivations agree, so only one candidate.
        assert_eq!(audio_file_candidates("Bald Eagle"), vec!["Bald-Eagle.mp3"]);
    }

    #[test]
    fn test_candidates_for_apostrophe_name() {
        assert_eq!(
            audio_file_candidates("Cooper's Hawk"),
            vec!["Cooper-s-Hawk.mp3", "Coopers-Hawk.mp3"]
        );
    }

    #[test]
    fn test_candidates_collapse_runs() {
        assert_eq!(
            audio_file_candidates("Le Conte's  Sparrow"),
            vec!["Le-Conte-s-Sparrow.mp3", "Le-Contes-Sparrow.mp3"]
        );
    }
}
