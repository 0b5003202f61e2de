//! Target languages the translation endpoint accepts.

/// A selectable translation target.
#[derive(Debug, PartialEq, Eq)]
pub struct Language {
    /// Language code sent as the `target_lang` form field
    pub code: &'static str,
    /// Human-readable name shown in the UI
    pub name: &'static str,
}

/// Default target when none is configured.
pub const DEFAULT_CODE: &str = "es";

/// All supported target languages, in selection order.
pub const LANGUAGES: &[Language] = &[
    Language { code: "es", name: "Spanish" },
    Language { code: "en", name: "English" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "it", name: "Italian" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "zh-CN", name: "Chinese (Simplified)" },
    Language { code: "ru", name: "Russian" },
    Language { code: "ar", name: "Arabic" },
    Language { code: "hi", name: "Hindi" },
];

/// Looks up a language by its code.
pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Returns the next language in selection order, wrapping at the end.
/// Used by the UI language-cycle key.
pub fn next_after(current: &Language) -> &'static Language {
    let index = LANGUAGES
        .iter()
        .position(|l| l.code == current.code)
        .unwrap_or(0);
    &LANGUAGES[(index + 1) % LANGUAGES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_known_code() {
        let lang = find("fr").unwrap();
        assert_eq!(lang.name, "French");
    }

    #[test]
    fn find_unknown_code() {
        assert!(find("tlh").is_none());
    }

    #[test]
    fn default_code_is_supported() {
        assert!(find(DEFAULT_CODE).is_some());
    }

    #[test]
    fn cycle_wraps_around() {
        let last = LANGUAGES.last().unwrap();
        assert_eq!(next_after(last).code, LANGUAGES[0].code);
        assert_eq!(next_after(&LANGUAGES[0]).code, LANGUAGES[1].code);
    }
}
