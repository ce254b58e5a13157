//! Filesystem-safe name cleaning.
//!
//! Maps each character that is illegal (or troublesome) in file names to
//! a visually similar allowed one. Renaming treats old and new names as
//! equal only after both have passed through [`clean_name`], so the table
//! is part of the crate's contract and must not drift.

/// Substitution table for filesystem-unsafe characters.
///
/// No substitute appears as a key, which keeps [`clean_name`] idempotent
/// when cleaned fragments are composed and cleaned again.
pub const FORBIDDEN_CHARACTERS: &[(char, char)] = &[
    ('<', 'ᐸ'),
    ('>', 'ᐳ'),
    (':', '꞉'),
    ('"', 'ˮ'),
    ('\'', 'ʻ'),
    ('/', 'Ⳇ'),
    ('\\', '∖'),
    ('|', 'ǀ'),
    ('?', 'ʔ'),
    ('*', '∗'),
    ('+', '＋'),
    ('%', '٪'),
    ('!', 'ⵑ'),
    ('`', '՝'),
    ('&', '&'), // not forbidden, kept as-is
    ('{', '❴'),
    ('}', '❵'),
    ('=', '᐀'),
    ('~', '～'), // also shows up in catalog numbers
    ('#', '#'), // no good alternative
    ('$', '$'),
    ('@', '@'),
];

/// Trims surrounding whitespace and substitutes every forbidden
/// character through [`FORBIDDEN_CHARACTERS`].
pub fn clean_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            FORBIDDEN_CHARACTERS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_forbidden_characters() {
        assert_eq!(clean_name("What? Yes: No"), "Whatʔ Yes꞉ No");
        assert_eq!(clean_name("A/B\\C|D"), "AⳆB∖CǀD");
        assert_eq!(clean_name("50% off!"), "50٪ offⵑ");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(clean_name("  padded name  "), "padded name");
    }

    #[test]
    fn leaves_clean_names_untouched() {
        assert_eq!(clean_name("Plain Album Name"), "Plain Album Name");
    }

    #[test]
    fn is_idempotent_over_the_whole_table() {
        let every_key: String = FORBIDDEN_CHARACTERS.iter().map(|(from, _)| *from).collect();
        let once = clean_name(&every_key);
        assert_eq!(clean_name(&once), once);

        let mixed = "Disc 1: Rime / of the ~Ancient~ Mariner?";
        assert_eq!(clean_name(&clean_name(mixed)), clean_name(mixed));
    }
}
