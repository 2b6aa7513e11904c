//! Glyph widths of the standard PDF fonts.
//!
//! Simple fonts from the standard 14 may omit `/Widths`; their advances
//! come from the Adobe font metrics instead. Only printable ASCII is
//! covered; other codes fall back to the caller's default.

/// Helvetica advances for codes 32..=126 (1/1000 em).
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A..Z
    278, 278, 278, 469, 556, 222, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a..z
    334, 260, 334, 584, // {..~
];

/// Times-Roman advances for codes 32..=126 (1/1000 em).
const TIMES: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 333, 333, 333, 500, 564, 250, 333, 250, 278, // ' '../
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // 0..9
    278, 278, 564, 564, 564, 444, 921, // :..@
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611, // A..Z
    333, 278, 333, 469, 500, 333, // [..`
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444, // a..z
    480, 200, 480, 541, // {..~
];

const COURIER: f32 = 600.0;

/// Advance of `code` in a standard font, if `base_font` names one.
///
/// Bold and oblique variants use the regular metrics of their family.
pub(crate) fn standard_width(base_font: &str, code: u32) -> Option<f32> {
    if base_font.starts_with("Courier") {
        return Some(COURIER);
    }
    let table = if base_font.starts_with("Helvetica") || base_font.starts_with("Arial") {
        &HELVETICA
    } else if base_font.starts_with("Times") {
        &TIMES
    } else {
        return None;
    };
    let index = code.checked_sub(32)? as usize;
    table.get(index).map(|w| f32::from(*w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_widths() {
        assert_eq!(standard_width("Helvetica", b'-' as u32), Some(333.0));
        assert_eq!(standard_width("Helvetica-Bold", b'i' as u32), Some(222.0));
        assert_eq!(standard_width("Times-Roman", b' ' as u32), Some(250.0));
        assert_eq!(standard_width("Times-Roman", b'~' as u32), Some(541.0));
        assert_eq!(standard_width("Courier-Oblique", 0xE9), Some(600.0));
    }

    #[test]
    fn test_unknown_fonts_and_codes() {
        assert_eq!(standard_width("CMR12", b'a' as u32), None);
        assert_eq!(standard_width("Helvetica", 10), None);
        assert_eq!(standard_width("Helvetica", 200), None);
    }
}
