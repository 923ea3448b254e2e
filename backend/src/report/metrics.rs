/// Times-Bold advance widths for 0x20..=0x7E, in 1/1000 em.
const TIMES_BOLD_ASCII: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // '0'..'9'
    333, 333, 570, 570, 570, 500, 930, // ':'..'@'
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, // 'A'..'M'
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, // 'N'..'Z'
    333, 278, 333, 581, 500, 333, // '['..'`'
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, // 'a'..'m'
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, // 'n'..'z'
    394, 220, 394, 520, // '{'..'~'
];

const FALLBACK_WIDTH: u16 = 500;

/// Width of Latin-1 encoded `text` set in Times-Bold at `font_size` points.
pub fn text_width(text: &[u8], font_size: f32) -> f32 {
    let units: u32 = text
        .iter()
        .map(|&b| match b {
            0x20..=0x7E => u32::from(TIMES_BOLD_ASCII[(b - 0x20) as usize]),
            _ => u32::from(FALLBACK_WIDTH),
        })
        .sum();
    units as f32 * font_size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_is_quarter_em() {
        assert_eq!(text_width(b" ", 16.0), 4.0);
    }

    #[test]
    fn digits_are_half_em() {
        assert_eq!(text_width(b"0123456789", 10.0), 50.0);
    }

    #[test]
    fn wide_glyphs_measure_wider() {
        assert!(text_width(b"W", 16.0) > text_width(b"i", 16.0));
        assert_eq!(text_width(b"", 16.0), 0.0);
    }
}
