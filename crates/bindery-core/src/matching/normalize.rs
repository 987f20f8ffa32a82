/// Canonical form of a title for comparison: Unicode letters and digits
/// lowercased, every other code point treated as a separator, separator runs
/// collapsed to a single space, no leading/trailing space.
///
/// Operates on `char`s, so non-ASCII letters (okina, macron vowels) survive
/// rather than being mangled byte-wise. Idempotent.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push(' ');
            }
            pending_separator = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_lowercases() {
        assert_eq!(normalize("Beaq, Ni—Ba (Moqon)!"), "beaq ni ba moqon");
    }

    #[test]
    fn test_collapses_whitespace_and_trims() {
        assert_eq!(normalize("  A   whale\tof a   tale "), "a whale of a tale");
    }

    #[test]
    fn test_keeps_pacific_language_letters() {
        // Okina (U+02BB) is a modifier letter, macron vowels are letters.
        assert_eq!(normalize("ʻŌlelo Hawaiʻi"), "ʻōlelo hawaiʻi");
        assert_eq!(normalize("Anapet me ewe chóón nááng"), "anapet me ewe chóón nááng");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Beaq Ni Ba Moqon Ngea Ba Raan",
            "ʻŌlelo   Hawaiʻi!",
            "  mixed CASE, with – dashes  ",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!—…"), "");
    }
}
