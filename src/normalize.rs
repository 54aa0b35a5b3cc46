//! Text normalization for playlist-to-library matching.
//!
//! `normalize` is shared by both sides of a comparison (external titles and
//! local filenames/tags). `strip_decoration` is only ever applied to
//! externally-sourced video titles, before `normalize`.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// DECORATION VOCABULARY
// ============================================================================

/// Qualifiers that mark a bracket group or pipe segment as decoration.
const QUALIFIER_VOCABULARY: &str = concat!(
    r"official|lyrics?|audio|(?:music\s+)?video|visuali[sz]er|colou?r\s+coded|",
    r"live|mv|m/v|hd|hq|4k|8k|remix|cover|feat\.?|ft\.?|prod\.?|",
    r"han|rom|eng",
);

/// Words removed when they stand alone after the bracket rules ran.
pub const STOPWORDS: &[&str] = &[
    "official",
    "video",
    "audio",
    "lyrics",
    "lyric",
    "feat",
    "ft",
    "prod",
    "remix",
    "vip",
    "edit",
    "version",
    "live",
    "cover",
    "han",
    "rom",
    "eng",
    "mv",
    "hd",
    "hq",
    "4k",
    "8k",
    "visualizer",
    "visualiser",
];

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Decoration rules (pattern, replacement), applied in order.
///
/// Removed text is replaced by a space so a kept word is never fused with
/// the word on the far side of a removed group.
pub static DECORATION_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // Bracket groups carrying a qualifier: "(Official Video)", "[Han/Rom/Eng]", "【MV】", "(feat. X)"
        (
            Regex::new(&format!(
                r"(?i)[\(\[【（][^\)\]】）]*?\b(?:{QUALIFIER_VOCABULARY})\b[^\)\]】）]*[\)\]】）]"
            ))
            .unwrap(),
            " ",
        ),
        // Trailing pipe segments carrying a qualifier: "Song | Official Lyric Video | HD"
        (
            Regex::new(&format!(
                r"(?i)(?:\s*[|｜][^|｜]*\b(?:{QUALIFIER_VOCABULARY})\b[^|｜]*)+$"
            ))
            .unwrap(),
            " ",
        ),
        // Empty bracket pairs left behind: "Song ()"
        (Regex::new(r"[\(\[【（]\s*[\)\]】）]").unwrap(), " "),
    ]
});

/// Standalone stopwords, matched on word boundaries.
pub static STOPWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternation = STOPWORDS
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
});

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
/// Used to filter out accents during normalization.
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

/// Quote and guillemet characters, dropped without leaving a gap ("don't" → "dont").
pub fn is_quote(c: char) -> bool {
    matches!(
        c,
        '\'' | '"'
            | '`'
            | '\u{00B4}'
            | '\u{2018}'..='\u{201F}'
            | '\u{2032}'..='\u{2037}'
            | '\u{00AB}'
            | '\u{00BB}'
            | '\u{2039}'
            | '\u{203A}'
            | '\u{FF02}'
            | '\u{FF07}'
    )
}

/// Apply NFKD decomposition and drop combining marks.
/// e.g., "Beyoncé" → "Beyonce", "naïve" → "naive"
pub fn fold_diacritics(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Canonicalize text into lowercase ASCII words separated by single spaces.
///
/// `&` and `+` become "and", quotes vanish, anything else outside
/// `[a-z0-9]` becomes a word break. Idempotent.
pub fn normalize(text: &str) -> String {
    let unquoted: String = text.chars().filter(|c| !is_quote(*c)).collect();
    let folded = fold_diacritics(&unquoted.to_lowercase());

    let mut out = String::with_capacity(folded.len());
    for c in folded.chars() {
        match c {
            '&' | '+' => out.push_str(" and "),
            'a'..='z' | '0'..='9' => out.push(c),
            'A'..='Z' => out.push(c.to_ascii_lowercase()),
            c if is_quote(c) => {}
            _ => out.push(' '),
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove promotional decoration from an externally-sourced video title.
/// The output is raw text meant to be fed to [`normalize`].
pub fn strip_decoration(raw_title: &str) -> String {
    let mut result = raw_title.to_string();

    for (pattern, replacement) in DECORATION_RULES.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }

    result = STOPWORD_PATTERN.replace_all(&result, " ").to_string();

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `normalize(strip_decoration(raw))`, the query form of an external title.
pub fn normalize_external_title(raw_title: &str) -> String {
    normalize(&strip_decoration(raw_title))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  Hello,   World!  "), "hello world");
        assert_eq!(normalize("AC/DC - Back In Black"), "ac dc back in black");
    }

    #[test]
    fn test_normalize_diacritics_and_case() {
        assert_eq!(normalize("Café"), normalize("CAFE"));
        assert_eq!(normalize("Björk"), "bjork");
        assert_eq!(normalize("Motörhead"), "motorhead");
    }

    #[test]
    fn test_normalize_ampersand_and_plus() {
        assert_eq!(normalize("Rock & Roll"), "rock and roll");
        assert_eq!(normalize("Simon+Garfunkel"), "simon and garfunkel");
    }

    #[test]
    fn test_normalize_quotes_removed_without_gap() {
        assert_eq!(normalize("Don't Stop"), "dont stop");
        assert_eq!(normalize("Don\u{2019}t Stop"), "dont stop");
        assert_eq!(normalize("«Chanson»"), "chanson");
        assert_eq!(normalize("\"Quoted\""), "quoted");
    }

    #[test]
    fn test_normalize_non_latin_becomes_breaks() {
        assert_eq!(normalize("кино - Song"), "song");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!! ???"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "Café del Mar (Remix) & Friends",
            "ＡＢＣ Ｆｕｌｌｗｉｄｔｈ",
            "Ǆemal's «Song» + Ünïcödé",
            "İstanbul",
            "tab\tand\nnewline",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_strip_official_video() {
        assert_eq!(strip_decoration("Artist - Song (Official Video)"), "Artist - Song");
        assert_eq!(
            normalize_external_title("Artist - Song (Official Music Video)"),
            "artist song"
        );
    }

    #[test]
    fn test_strip_bracket_groups() {
        assert_eq!(strip_decoration("Song [Lyrics]"), "Song");
        assert_eq!(strip_decoration("Song (feat. Someone Else)"), "Song");
        assert_eq!(strip_decoration("Song [Han/Rom/Eng]"), "Song");
        assert_eq!(strip_decoration("Song (Color Coded Lyrics)"), "Song");
        assert_eq!(strip_decoration("Song 【MV】"), "Song");
        assert_eq!(strip_decoration("Song (4K Remaster)"), "Song");
    }

    #[test]
    fn test_strip_keeps_plain_brackets() {
        assert_eq!(strip_decoration("Song (Part Two)"), "Song (Part Two)");
    }

    #[test]
    fn test_strip_trailing_pipe_segments() {
        assert_eq!(
            strip_decoration("Artist - Song | Official Lyric Video | HD"),
            "Artist - Song"
        );
        assert_eq!(strip_decoration("Song | Artist"), "Song | Artist");
    }

    #[test]
    fn test_strip_standalone_stopwords() {
        assert_eq!(normalize_external_title("Song - Official Audio"), "song");
        assert_eq!(normalize_external_title("Song ft. Other"), "song other");
        // Stopwords inside other words survive
        assert_eq!(normalize_external_title("Livewire"), "livewire");
    }

    #[test]
    fn test_strip_only_decoration_is_empty() {
        assert_eq!(normalize_external_title("Official Video"), "");
        assert_eq!(normalize_external_title("(Official Video) [HD]"), "");
    }

    #[test]
    fn test_strip_does_not_fuse_words() {
        assert_eq!(normalize_external_title("Hello(Official Video)World"), "hello world");
    }
}
