//! Visual width accounting for dashboard lines.
//!
//! The pinned gist preview renders in a monospace grid where emoji occupy
//! two cells, box-drawing characters one, and variation selectors none.
//! Width here means rendering width, not character count — a 43-cell line
//! can hold far fewer than 43 characters once emoji are involved.

/// East-Asian Wide and Fullwidth ranges (CJK, Hangul, fullwidth forms).
///
/// Covers the blocks that matter for dashboard content; exotic scripts the
/// jobs never emit are deliberately absent.
const WIDE_RANGES: &[(u32, u32)] = &[
    (0x1100, 0x115F),  // Hangul Jamo
    (0x2E80, 0x303E),  // CJK radicals, punctuation
    (0x3041, 0x33FF),  // Kana, CJK symbols
    (0x3400, 0x4DBF),  // CJK extension A
    (0x4E00, 0x9FFF),  // CJK unified ideographs
    (0xA000, 0xA4CF),  // Yi
    (0xAC00, 0xD7A3),  // Hangul syllables
    (0xF900, 0xFAFF),  // CJK compatibility ideographs
    (0xFE30, 0xFE4F),  // CJK compatibility forms
    (0xFF00, 0xFF60),  // Fullwidth forms
    (0xFFE0, 0xFFE6),  // Fullwidth signs
];

/// Symbol blocks below the emoji planes that GitHub renders as emoji
/// (miscellaneous symbols, dingbats, and misc symbols-and-arrows).
const EMOJI_SYMBOL_RANGES: &[(u32, u32)] = &[
    (0x2600, 0x27BF),
    (0x2B00, 0x2BFF),
];

fn in_ranges(cp: u32, ranges: &[(u32, u32)]) -> bool {
    ranges.iter().any(|&(lo, hi)| cp >= lo && cp <= hi)
}

/// Visual width of a single character.
///
/// - Variation selectors (U+FE00–U+FE0F) and ZWJ (U+200D): 0
/// - East-Asian Wide/Fullwidth: 2
/// - Code points above U+1F000 (emoji planes): 2
/// - Misc symbols / dingbats blocks rendered as emoji: 2
/// - Everything else (ASCII, box drawing `│`, gauges `▓░`, arrows): 1
pub fn char_width(c: char) -> usize {
    let cp = c as u32;
    if (0xFE00..=0xFE0F).contains(&cp) || cp == 0x200D {
        return 0;
    }
    if in_ranges(cp, WIDE_RANGES) {
        return 2;
    }
    if cp > 0x1F000 {
        return 2;
    }
    if in_ranges(cp, EMOJI_SYMBOL_RANGES) {
        return 2;
    }
    1
}

/// Visual width of a whole line.
pub fn visual_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_chars_are_one() {
        assert_eq!(visual_width("VIX 14 cntgo"), 12);
        assert_eq!(char_width('│'), 1);
        assert_eq!(char_width('▓'), 1);
        assert_eq!(char_width('░'), 1);
        assert_eq!(char_width('▲'), 1);
        assert_eq!(char_width('→'), 1);
    }

    #[test]
    fn emoji_are_two() {
        assert_eq!(char_width('💸'), 2);
        assert_eq!(char_width('🟢'), 2);
        assert_eq!(char_width('📋'), 2);
        assert_eq!(char_width('💡'), 2);
        assert_eq!(char_width('🔮'), 2);
    }

    #[test]
    fn scale_symbol_is_two() {
        // U+2696 sits below the emoji planes but GitHub renders it wide.
        assert_eq!(char_width('⚖'), 2);
        assert_eq!(char_width('⚠'), 2);
    }

    #[test]
    fn joiners_and_selectors_are_zero() {
        assert_eq!(char_width('\u{200D}'), 0);
        assert_eq!(char_width('\u{FE0F}'), 0);
        // ZWJ sequence: two wide emoji joined by a zero-width joiner.
        assert_eq!(visual_width("😮\u{200D}💨"), 4);
        // Emoji presentation selector adds nothing.
        assert_eq!(visual_width("⚖\u{FE0F}"), 2);
    }

    #[test]
    fn cjk_is_two() {
        assert_eq!(char_width('日'), 2);
        assert_eq!(visual_width("日本"), 4);
    }

    #[test]
    fn width_budget_boundary() {
        // One 2-width emoji plus 41 ordinary characters is exactly 43.
        let line = format!("💸{}", "x".repeat(41));
        assert_eq!(visual_width(&line), 43);
        // One more character tips it over.
        let line = format!("💸{}", "x".repeat(42));
        assert_eq!(visual_width(&line), 44);
    }
}
