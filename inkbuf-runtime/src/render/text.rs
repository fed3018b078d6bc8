use fontdue::Font;
use unicode_segmentation::UnicodeSegmentation;

use super::{DrawBuf, Drawable, Pixel};
use crate::graphics::{Color, BLACK};
use crate::layout::{Position, Size};

/// Coverage mask of one glyph, one byte per pixel, ready for [`DrawBuf::draw_bitmap`].
///
/// Offsets are relative to the top-left of the text line (the line is `size` pixels tall,
/// with the baseline at its bottom).
#[derive(Clone, Debug)]
pub struct GlyphMask {
    bitmap: Vec<u8>,
    width: Pixel,
    height: Pixel,

    /// Horizontal bearing
    left: Pixel,
    top: Pixel,

    advance: Pixel,
}
impl GlyphMask {
    pub fn rasterize(font: &Font, size: Pixel, character: char) -> Self {
        let (metrics, bitmap) = font.rasterize(character, size as f32);
        let height = metrics.height as Pixel;
        Self {
            bitmap,
            width: metrics.width as Pixel,
            height,
            left: metrics.xmin,
            top: size - metrics.ymin - height,
            advance: metrics.advance_width.round() as Pixel,
        }
    }

    pub fn advance(&self) -> Pixel {
        self.advance
    }

    /// Nothing to stamp, e.g. a space
    pub fn is_blank(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn stamp(&self, buf: &mut dyn DrawBuf, position: Position, palette: &[Color]) {
        if self.is_blank() {
            return;
        }
        buf.draw_bitmap(
            position.x + self.left,
            position.y + self.top,
            &self.bitmap,
            self.width,
            self.height,
            palette,
        );
    }
}

/// A single line of text rasterized glyph by glyph, left to right.
///
/// One glyph per grapheme cluster (its first code point); no shaping, no wrapping.
pub struct TextRun {
    glyphs: Vec<GlyphMask>,
    size: Pixel,
    pub foreground: Color,
}
impl TextRun {
    pub fn new(font: &Font, text: &str, size: Pixel) -> Self {
        let glyphs = text
            .graphemes(true)
            .filter_map(|cluster| cluster.chars().next())
            .map(|ch| GlyphMask::rasterize(font, size, ch))
            .collect();
        Self {
            glyphs,
            size,
            foreground: BLACK,
        }
    }

    pub fn with_foreground(mut self, foreground: Color) -> Self {
        self.foreground = foreground;
        self
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.glyphs.iter().map(GlyphMask::advance).sum(),
            height: self.size,
        }
    }
}
impl Drawable for TextRun {
    fn draw_at(&self, buf: &mut dyn DrawBuf, position: Position) {
        let palette = [self.foreground];
        let mut cursor = position.x;
        for glyph in &self.glyphs {
            glyph.stamp(
                buf,
                Position {
                    x: cursor,
                    y: position.y,
                },
                &palette,
            );
            cursor += glyph.advance;
        }
    }
}
