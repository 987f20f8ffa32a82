use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Filename convention: `PALM [-] <collection-descriptor> - <LANGUAGE> - <title>`.
    /// The language token is upper-case in the source scans; matching is
    /// case-insensitive throughout.
    static ref FILENAME_RE: Regex = Regex::new(
        r"(?i)^PALM\s*-?\s*(?P<collection>[^-]*?)\s*-\s*(?P<language>[^-]+?)\s*-\s*(?P<title>.+)$",
    )
    .expect("filename pattern is valid");

    static ref EXTENSION_RE: Regex =
        Regex::new(r"\.[A-Za-z0-9]{1,5}$").expect("extension pattern is valid");
}

/// Canonical collection a scanned file belongs to, derived from the free-text
/// descriptor between the prefix and the language token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionTag {
    PalmCd,
    PalmFinal,
    PalmTrial,
    Palm,
}

impl CollectionTag {
    /// Substring tests in fixed priority order; descriptors can contain
    /// several keywords ("Printed [Trial version]") and the first rule wins.
    fn from_descriptor(descriptor: &str) -> Self {
        let lowered = descriptor.to_lowercase();
        if lowered.contains("cd") {
            CollectionTag::PalmCd
        } else if lowered.contains("printed") {
            CollectionTag::PalmFinal
        } else if lowered.contains("trial") {
            CollectionTag::PalmTrial
        } else {
            CollectionTag::Palm
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CollectionTag::PalmCd => "PALM CD",
            CollectionTag::PalmFinal => "PALM final",
            CollectionTag::PalmTrial => "PALM Trial",
            CollectionTag::Palm => "PALM",
        }
    }
}

impl std::fmt::Display for CollectionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Structured decomposition of an artifact filename. Either every field is
/// populated or parsing yielded `None`; there is no partial form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileInfo {
    pub collection: CollectionTag,
    pub language: String,
    pub title: String,
    /// Original filename, retained for traceability in reports and logs.
    pub source_name: String,
}

/// Parse an artifact filename into its structured fields.
///
/// Returns `None` when the name does not follow the convention, an expected
/// outcome for stray files rather than an error. Pure; parsing the same
/// string twice yields identical results.
pub fn parse(filename: &str) -> Option<ParsedFileInfo> {
    let captures = FILENAME_RE.captures(filename.trim())?;

    let descriptor = captures.name("collection").map_or("", |m| m.as_str());
    let language = captures.name("language")?.as_str().trim();
    let raw_title = captures.name("title")?.as_str().trim();

    let title = EXTENSION_RE.replace(raw_title, "").trim().to_string();
    if language.is_empty() || title.is_empty() {
        return None;
    }

    Some(ParsedFileInfo {
        collection: CollectionTag::from_descriptor(descriptor),
        language: language.to_string(),
        title,
        source_name: filename.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_cd_convention() {
        let parsed = parse("PALM CD - Chuukese - Anapet me ewe chóón nááng.pdf").unwrap();
        assert_eq!(parsed.collection, CollectionTag::PalmCd);
        assert_eq!(parsed.collection.display_name(), "PALM CD");
        assert_eq!(parsed.language, "Chuukese");
        assert_eq!(parsed.title, "Anapet me ewe chóón nááng");
        assert_eq!(
            parsed.source_name,
            "PALM CD - Chuukese - Anapet me ewe chóón nááng.pdf"
        );
    }

    #[test]
    fn test_printed_descriptor_wins_over_trial() {
        let parsed =
            parse("PALM - Printed [Trial version] - YAPESE - Beaq Ni Ba Moqon Ngea Ba Raan.pdf")
                .unwrap();
        assert_eq!(parsed.collection, CollectionTag::PalmFinal);
        assert_eq!(parsed.language, "YAPESE");
        assert_eq!(parsed.title, "Beaq Ni Ba Moqon Ngea Ba Raan");
    }

    #[test]
    fn test_trial_descriptor_without_printed() {
        let parsed = parse("PALM Trial - Kosraean - Sroal ac Srik.pdf").unwrap();
        assert_eq!(parsed.collection, CollectionTag::PalmTrial);
    }

    #[test]
    fn test_bare_descriptor_maps_to_default_tag() {
        let parsed = parse("PALM - Pohnpeian - Lihen Pahnsed.pdf").unwrap();
        assert_eq!(parsed.collection, CollectionTag::Palm);
        assert_eq!(parsed.language, "Pohnpeian");
        assert_eq!(parsed.title, "Lihen Pahnsed");
    }

    #[test]
    fn test_title_may_contain_hyphens() {
        let parsed = parse("PALM CD - Marshallese - Juon raan - juon bwebwenato.pdf").unwrap();
        assert_eq!(parsed.title, "Juon raan - juon bwebwenato");
    }

    #[test]
    fn test_non_matching_names_yield_none() {
        assert_eq!(parse("notes.pdf"), None);
        assert_eq!(parse("PALM CD - Chuukese.pdf"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("scan_0042.pdf"), None);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let name = "PALM CD - Chuukese - Anapet me ewe chóón nááng.pdf";
        assert_eq!(parse(name), parse(name));
    }
}
