//! Glyph widths of the standard Type1 fonts, in 1/1000 em.
//!
//! ASCII widths come from the Adobe core AFM files. Bytes above 0x7F use
//! 1000, the widest glyph in that range, so measured text never runs long.

use crate::encoding::to_win_ansi;
use crate::layout::Font;

/// Helvetica, 0x20..=0x7E.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold, 0x20..=0x7E.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

const COURIER: u16 = 600;
const HIGH_BYTE: u16 = 1000;

/// Width of one encoded byte.
pub(crate) fn glyph_width(font: Font, byte: u8) -> u16 {
    let table = match font {
        Font::Mono => return COURIER,
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    match byte {
        0x20..=0x7E => table[(byte - 0x20) as usize],
        0x80..=0xFF => HIGH_BYTE,
        _ => 0,
    }
}

/// Width of `text` as it will be encoded, in 1/1000 em.
pub(crate) fn text_width(font: Font, text: &str) -> usize {
    to_win_ansi(text)
        .iter()
        .map(|&b| glyph_width(font, b) as usize)
        .sum()
}

/// Width of one character, in 1/1000 em.
pub(crate) fn char_width(font: Font, c: char) -> usize {
    let mut buf = [0u8; 4];
    text_width(font, c.encode_utf8(&mut buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(text_width(Font::Regular, "Hi"), 722 + 222);
        assert_eq!(text_width(Font::Bold, "W"), 944);
        assert_eq!(text_width(Font::Mono, "any text"), 8 * 600);
        assert_eq!(glyph_width(Font::Regular, b'~'), 584);
        assert_eq!(glyph_width(Font::Bold, b'm'), 889);
    }

    #[test]
    fn test_non_ascii_is_wide() {
        assert_eq!(char_width(Font::Regular, 'é'), 1000);
        assert_eq!(char_width(Font::Regular, '•'), 1000);
        assert_eq!(char_width(Font::Regular, '\u{7}'), 0);
    }
}
