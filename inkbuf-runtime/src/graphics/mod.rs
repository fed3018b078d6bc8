pub mod dither;
pub mod typeface;

use palette::{Srgb, Srgba};

/// Packed `0xAARRGGBB` color.
///
/// The alpha byte is inverted relative to the usual convention:
/// `0x00` is a fully opaque source color and `0xFF` is fully transparent.
/// A bare `0xRRGGBB` literal is therefore an opaque color.
pub type Color = u32;

pub const BLACK: Color = 0x000000;
pub const WHITE: Color = 0xFFFFFF;

/// Source transparency, the top byte of a packed color (0 = opaque)
#[inline]
pub fn alpha(color: Color) -> u32 {
    (color >> 24) & 0xFF
}

/// Packs an opaque sRGB color
pub fn from_srgb(color: Srgb<u8>) -> Color {
    ((color.red as u32) << 16) | ((color.green as u32) << 8) | color.blue as u32
}

/// Packs an sRGB color with conventional alpha (255 = opaque), flipping the alpha byte on the way in
pub fn from_srgba(color: Srgba<u8>) -> Color {
    ((255 - color.alpha as u32) << 24) | from_srgb(color.color)
}

pub fn to_srgba(color: Color) -> Srgba<u8> {
    Srgba::new(
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
        255 - alpha(color) as u8,
    )
}

/// Blends `src` over `dst` with source transparency `alpha` (0 = opaque, 255 = invisible).
///
/// Red and blue are blended together in one word and green in another,
/// masked after the shift so nothing carries between channels.
/// The result has alpha byte 0.
pub fn apply_alpha_rgb(dst: &mut Color, src: Color, alpha: u32) {
    if alpha == 0 {
        *dst = src;
    } else if alpha < 255 {
        let src = src & 0xFFFFFF;
        let opaque = 256 - alpha;
        let n1 = (((*dst & 0xFF00FF) * alpha + (src & 0xFF00FF) * opaque) >> 8) & 0xFF00FF;
        let n2 = (((*dst & 0x00FF00) * alpha + (src & 0x00FF00) * opaque) >> 8) & 0x00FF00;
        *dst = n1 | n2;
    }
}

/// Blends `src` over `dst` with a 4-bit opacity (`0..=15`) as carried by glyph masks.
///
/// Near-opaque values (12 and up) snap to `src` and near-transparent ones (3 and below) leave `dst` alone;
/// everything in between is a sixteenths blend per channel pair.
pub fn apply_opacity_nibble(dst: &mut Color, src: Color, opaque: u32) {
    if opaque >= 12 {
        *dst = src;
    } else if opaque > 3 {
        let alpha = 15 - opaque;
        let n1 = ((alpha * (*dst & 0xFF00FF) + opaque * (src & 0xFF00FF)) >> 4) & 0xFF00FF;
        let n2 = ((alpha * (*dst & 0x00FF00) + opaque * (src & 0x00FF00)) >> 4) & 0x00FF00;
        *dst = n1 | n2;
    }
}
