//! Answer normalization for typed answers.

/// Contracted negatives and the long forms accepted in their place.
const CONTRACTIONS: [(&str, &str); 3] = [
    ("didn't", "did not"),
    ("wasn't", "was not"),
    ("weren't", "were not"),
];

/// Canonical comparable form of free-text input.
///
/// Applied in order: trim, lowercase, strip one trailing `.`, `!` or `?`,
/// collapse every whitespace run to a single space. Total over all strings.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = lowered
        .strip_suffix(['.', '!', '?'])
        .unwrap_or(lowered.as_str());
    collapse_whitespace(stripped)
}

// Not `split_whitespace().join(" ")`: a run at either end must survive as one space.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Replace every contracted negative in an already-normalized string by its
/// long form.
pub fn expand_contractions(canonical: &str) -> String {
    CONTRACTIONS
        .iter()
        .fold(canonical.to_string(), |acc, (short, long)| {
            acc.replace(short, long)
        })
}

/// Compare typed input against a free-text key.
///
/// With `expand` set, the long form of a contracted key is accepted too.
pub fn matches_free_text(input: &str, key: &str, expand: bool) -> bool {
    let user = normalize(input);
    let answer = normalize(key);
    if user == answer {
        return true;
    }
    expand && user == expand_contractions(&answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_basic() {
        assert_eq!(normalize("  Where did you SLEEP?  "), "where did you sleep");
        assert_eq!(normalize("It was   a\thot day."), "it was a hot day");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn normalize_strips_only_one_terminal_mark() {
        assert_eq!(normalize("Oh no!!"), "oh no!");
        assert_eq!(normalize("Really?."), "really?");
        assert_eq!(normalize("wait, what"), "wait, what");
    }

    #[test]
    fn normalize_keeps_space_left_before_stripped_mark() {
        assert_eq!(normalize("sunny ."), "sunny ");
    }

    #[test]
    fn normalize_invariance_under_period_and_case() {
        for s in [
            "Trees didn't blow down in the tornado",
            "How long did you walk for",
            "x",
        ] {
            assert_eq!(normalize(s), normalize(&format!("{s}.")));
            assert_eq!(normalize(s), normalize(&format!("  {}  ", s.to_uppercase())));
        }
    }

    #[test]
    fn expand_replaces_every_occurrence() {
        assert_eq!(
            expand_contractions("it wasn't hot and we didn't swim and they weren't there"),
            "it was not hot and we did not swim and they were not there"
        );
    }

    #[test]
    fn free_text_contraction_equivalence() {
        let key = "Trees didn't blow down in the tornado";
        assert!(matches_free_text("Trees didn't blow down in the tornado.", key, true));
        assert!(matches_free_text("Trees did not blow down in the tornado", key, true));
        assert!(!matches_free_text("Trees did not blow down in the tornado", key, false));
    }

    #[test]
    fn free_text_does_not_accept_contracted_input_for_long_key() {
        assert!(!matches_free_text("It wasn't hot", "It was not hot", true));
    }
}
