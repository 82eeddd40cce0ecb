//! WinAnsi (cp1252) text encoding for the standard Type1 fonts.

/// cp1252 code points above 0x7F that differ from Latin-1.
const CP1252_HIGH: &[(char, u8)] = &[
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// The cp1252 byte for a printable character, if it has one.
fn lookup(c: char) -> Option<u8> {
    match c as u32 {
        0x20..=0x7E => Some(c as u8),
        0xA0..=0xFF => Some(c as u32 as u8),
        _ => CP1252_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, b)| *b),
    }
}

/// Encode text for a WinAnsiEncoding font. Tabs become spaces, other
/// control characters are dropped, unmappable characters become `?`.
pub(crate) fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(b' '),
            c if c.is_control() => None,
            c => Some(lookup(c).unwrap_or(b'?')),
        })
        .collect()
}

/// Characters that `to_win_ansi` prints as `?`.
pub(crate) fn unmappable_count(text: &str) -> usize {
    text.chars()
        .filter(|c| !c.is_control() && lookup(*c).is_none())
        .count()
}

#[cfg(test)]
pub(crate) fn from_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH
                .iter()
                .find(|(_, code)| *code == b)
                .map(|(ch, _)| *ch)
                .unwrap_or('?'),
            b => b as char,
        })
        .collect()
}
