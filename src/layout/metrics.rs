//! Glyph widths of the built-in Helvetica faces, in 1/1000 em.
//!
//! The oblique faces share the widths of their upright counterparts.

use super::FontStyle;

const MM_PER_PT: f32 = 25.4 / 72.0;
const DEFAULT_WIDTH: u16 = 556;

/// Widths for code points 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

fn glyph_width(ch: char, style: FontStyle) -> u16 {
    let table = if style.is_bold() {
        &HELVETICA_BOLD
    } else {
        &HELVETICA
    };
    let code = ch as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Width of `text` in millimetres at `size_pt`.
pub fn string_width(text: &str, style: FontStyle, size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(glyph_width(ch, style))).sum();
    units as f32 / 1000.0 * pt_to_mm(size_pt)
}

/// Maps text onto what the built-in fonts can show: common typographic
/// punctuation becomes ASCII, anything else outside Latin-1 becomes `?`.
pub fn to_latin1(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2026}' => '.',
            '\t' => ' ',
            ch if (ch as u32) <= 0xFF => ch,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_is_wider_than_regular() {
        let regular = string_width("Personal Branding", FontStyle::Regular, 18.0);
        let bold = string_width("Personal Branding", FontStyle::Bold, 18.0);
        assert!(bold > regular);
    }

    #[test]
    fn width_scales_with_size() {
        let small = string_width("abc", FontStyle::Regular, 10.0);
        let large = string_width("abc", FontStyle::Regular, 20.0);
        assert!((large - 2.0 * small).abs() < 1e-4);
    }

    #[test]
    fn known_width() {
        // "A" is 667/1000 em; 1000/1000 em at 72pt is 25.4mm.
        let width = string_width("A", FontStyle::Italic, 72.0);
        assert!((width - 0.667 * 25.4).abs() < 1e-3);
    }

    #[test]
    fn to_latin1_replaces_unsupported_chars() {
        assert_eq!(to_latin1("it\u{2019}s \u{2014} caf\u{e9} \u{1F600}"), "it's - caf\u{e9} ?");
    }
}
