pub const CODE_DELIMITER: &str = "---";

/// Characters skipped from the start of the delimiter: the dashes plus one line break.
const CODE_OFFSET: usize = 4;

/// Splits a raw answer at the first `---` and returns what follows, trimmed.
///
/// Positions are counted in chars, so a character outside the Basic
/// Multilingual Plane occupies one position, not two. When the delimiter is missing the
/// search position is taken as -1, so the cut lands at character 3 of the raw
/// text instead of returning it whole: `"no delimiter here"` yields
/// `"delimiter here"`. A cut past the end yields an empty string.
pub fn extract_code(raw: &str) -> String {
    let found = raw
        .find(CODE_DELIMITER)
        .map(|byte_idx| raw[..byte_idx].chars().count() as isize)
        .unwrap_or(-1);
    let start = usize::try_from(found + CODE_OFFSET as isize).unwrap_or_default();
    let tail: String = raw.chars().skip(start).collect();
    tail.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn returns_body_after_delimiter() {
        assert_eq!(
            extract_code("Here is the answer.\n---\nfn main() {}\n"),
            "fn main() {}"
        );
    }

    #[test]
    fn only_the_first_delimiter_splits() {
        assert_eq!(
            extract_code("intro\n---\nlet a = 1;\n---\nlet b = 2;"),
            "let a = 1;\n---\nlet b = 2;"
        );
    }

    #[test]
    fn missing_delimiter_cuts_three_characters_in() {
        assert_eq!(extract_code("no delimiter here"), "delimiter here");
        assert_eq!(extract_code("abcdef"), "def");
    }

    #[test]
    fn missing_delimiter_on_short_text_is_empty() {
        assert_eq!(extract_code(""), "");
        assert_eq!(extract_code("ok"), "");
        assert_eq!(extract_code("abc"), "");
    }

    #[test]
    fn delimiter_at_end_yields_empty() {
        assert_eq!(extract_code("text ---"), "");
    }

    #[test]
    fn offset_skips_exactly_one_character_after_dashes() {
        assert_eq!(extract_code("a---bcd"), "cd");
    }

    #[test]
    fn multibyte_text_is_cut_on_characters() {
        assert_eq!(extract_code("héllo wörld"), "lo wörld");
        assert_eq!(extract_code("Voilà\n---\nfn é() {}"), "fn é() {}");
    }

    #[test]
    fn astral_characters_count_as_one_position() {
        assert_eq!(extract_code("😀abcdef"), "cdef");
        assert_eq!(extract_code("😀\n---\nfn main() {}"), "fn main() {}");
    }
}
