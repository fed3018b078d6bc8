//! Ordered dithering down to 1 or 2 bits of gray.
//!
//! Everything here is a pure function of `(color, x, y)`; the threshold matrix tiles every 8 pixels,
//! so output is reproducible and can be compared against precomputed tables.
//! Level 0 is always the darkest.

use super::Color;

/// 8x8 ordered-dither thresholds, `1..=64`, indexed by `(x & 7) | ((y & 7) << 3)`
pub const THRESHOLD_8X8: [u8; 64] = [
    1, 33, 13, 45, 3, 35, 15, 47, //
    49, 17, 61, 29, 51, 19, 63, 31, //
    9, 41, 5, 37, 11, 43, 7, 39, //
    57, 25, 53, 21, 59, 27, 55, 23, //
    4, 36, 16, 48, 2, 34, 14, 46, //
    52, 20, 64, 32, 50, 18, 62, 30, //
    12, 44, 8, 40, 10, 42, 6, 38, //
    60, 28, 56, 24, 58, 26, 54, 22, //
];

/// Integer approximation of the channel average, `0..=254`
#[inline]
pub fn luminance(color: Color) -> i32 {
    let sum = ((color >> 16) & 255) + ((color >> 8) & 255) + (color & 255);
    ((sum * 85) >> 8) as i32
}

/// Signed dither offset for a pixel, `threshold - 32`, so `-31..=32`
#[inline]
pub fn threshold_offset(x: u32, y: u32) -> i32 {
    THRESHOLD_8X8[((x & 7) | ((y & 7) << 3)) as usize] as i32 - 32
}

/// Quantizes `color` to a 2-bit gray level (0 = black, 3 = white)
pub fn dither_2bit_color(color: Color, x: u32, y: u32) -> u32 {
    let cl = luminance(color);
    if cl < 5 {
        return 0;
    } else if cl >= 250 {
        return 3;
    }

    let cl = cl + threshold_offset(x, y);
    if cl < 5 {
        0
    } else if cl >= 250 {
        3
    } else {
        ((cl >> 6) & 3) as u32
    }
}

/// Quantizes `color` to a single bit (0 = black, 1 = white)
pub fn dither_1bit_color(color: Color, x: u32, y: u32) -> u32 {
    let cl = luminance(color);
    if cl < 16 {
        return 0;
    } else if cl >= 240 {
        return 1;
    }

    let cl = cl + threshold_offset(x, y);
    if cl < 5 {
        0
    } else if cl >= 250 {
        1
    } else {
        ((cl >> 7) & 1) as u32
    }
}

/// 2x2 patterns used when squashing a 2-bit level into one bit,
/// indexed by `[level][(x & 1) | ((y & 1) << 1)]`
pub const LEVEL_PATTERN_2X2: [[u8; 4]; 4] = [
    [0, 0, 0, 0],
    [0, 0, 1, 0],
    [0, 1, 0, 1],
    [1, 1, 1, 1],
];

/// One bit for a 2-bit `level` at `(x, y)`, spreading mid grays over a 2x2 pattern
#[inline]
pub fn dither_level_to_bit(level: u8, x: usize, y: usize) -> u8 {
    LEVEL_PATTERN_2X2[(level & 3) as usize][(x & 1) | ((y & 1) << 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_is_a_permutation() {
        let mut seen = [false; 64];
        for v in THRESHOLD_8X8 {
            assert!((1..=64).contains(&v));
            assert!(!seen[v as usize - 1], "duplicate threshold {v}");
            seen[v as usize - 1] = true;
        }
    }

    #[test]
    fn black_and_white_are_fixed_everywhere() {
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(dither_2bit_color(0x000000, x, y), 0);
                assert_eq!(dither_1bit_color(0x000000, x, y), 0);
                assert_eq!(dither_2bit_color(0xFFFFFF, x, y), 3);
                assert_eq!(dither_1bit_color(0xFFFFFF, x, y), 1);
            }
        }
    }

    #[test]
    fn alpha_byte_is_ignored() {
        assert_eq!(dither_2bit_color(0xFF808080, 3, 5), dither_2bit_color(0x808080, 3, 5));
    }

    #[test]
    fn pattern_tiles_every_eight_pixels() {
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(
                    dither_2bit_color(0x606060, x, y),
                    dither_2bit_color(0x606060, x + 8, y + 16)
                );
                assert_eq!(
                    dither_1bit_color(0x707070, x, y),
                    dither_1bit_color(0x707070, x + 24, y + 8)
                );
            }
        }
    }

    #[test]
    fn mid_gray_mixes_levels() {
        // luminance of 0x808080 is 127, right on a level boundary
        let ones = (0..8)
            .flat_map(|y| (0..8).map(move |x| dither_1bit_color(0x808080, x, y)))
            .filter(|&bit| bit == 1)
            .count();
        assert!(ones > 16 && ones < 48, "got {ones} white pixels out of 64");
    }

    #[test]
    fn known_values() {
        // luminance(0x404040) = 192 * 85 >> 8 = 63
        assert_eq!(luminance(0x404040), 63);
        // (0,0): threshold 1, offset -31 -> 32 -> level 0
        assert_eq!(dither_2bit_color(0x404040, 0, 0), 0);
        // (6,5): threshold 62, offset 30 -> 93 -> level 1
        assert_eq!(dither_2bit_color(0x404040, 6, 5), 1);
        // luminance(0x212121) = 32; (2,5): threshold 64 -> 64 -> level 1
        assert_eq!(luminance(0x212121), 32);
        assert_eq!(dither_2bit_color(0x212121, 2, 5), 1);
        // (3,5): threshold 32 lands exactly on 64 only for luminance 64
        assert_eq!(dither_2bit_color(0x404040, 3, 5), 0);
        assert_eq!(dither_2bit_color(0x414141, 3, 5), 1);
    }

    #[test]
    fn gray_ramp_follows_threshold_formula() {
        for v in 0..=255u32 {
            let gray = (v << 16) | (v << 8) | v;
            let lum = luminance(gray);
            for y in 0..8 {
                for x in 0..8 {
                    let t = THRESHOLD_8X8[(x | (y << 3)) as usize] as i32;
                    let level = lum + t - 32;
                    let two = if lum < 5 || level < 5 {
                        0
                    } else if lum >= 250 || level >= 250 {
                        3
                    } else {
                        (level >> 6) & 3
                    };
                    assert_eq!(dither_2bit_color(gray, x, y) as i32, two, "gray {v:#x} at ({x}, {y})");

                    let one = if lum < 16 || level < 5 {
                        0
                    } else if lum >= 240 || level >= 250 {
                        1
                    } else {
                        (level >> 7) & 1
                    };
                    assert_eq!(dither_1bit_color(gray, x, y) as i32, one, "gray {v:#x} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn level_pattern_extremes() {
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(dither_level_to_bit(0, x, y), 0);
            assert_eq!(dither_level_to_bit(3, x, y), 1);
        }
        assert_eq!(dither_level_to_bit(2, 1, 0), 1);
        assert_eq!(dither_level_to_bit(2, 0, 0), 0);
    }
}
