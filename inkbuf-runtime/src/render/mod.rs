/// Packed 1 and 2 bits-per-pixel buffers
pub mod gray;

/// 32 bits-per-pixel buffer
pub mod color;

/// Streaming, scaled image compositing
pub mod image;

/// True color to any depth transfer
pub mod blit;

/// Glyph stamping on top of `draw_bitmap`.
pub mod text;

use std::fmt::Display;

use crate::graphics::Color;
use crate::layout::{Position, Rect, Size};

pub use self::color::{ColorBuf, RowOrder};
pub use self::gray::{BitDepth, GrayBuf};
pub use self::image::{ImageDecoderCallback, ImageSource, RgbaImage, ScaledDrawCallback};

/// Signed integer pixels; geometry may hang off any edge of a buffer
pub type Pixel = i32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// The destination stores pixels in a layout compositing can't address
    UnsupportedDepth(u32),
    /// A decoder handed over a scan line narrower than the image it announced
    RowTooShort {
        row: Pixel,
        expected: usize,
        actual: usize,
    },
    /// Reported by an image source
    Decode(String),
}
impl Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::UnsupportedDepth(bpp) => {
                write!(f, "unsupported destination depth: {bpp} bits per pixel")
            }
            DrawError::RowTooShort {
                row,
                expected,
                actual,
            } => write!(
                f,
                "decoded row {row} has {actual} pixels, expected at least {expected}"
            ),
            DrawError::Decode(reason) => write!(f, "image decode failed: {reason}"),
        }
    }
}
impl std::error::Error for DrawError {}

/// Where a buffer keeps its pixels.
///
/// The heap `Vec` is the default; a platform adapter can back a buffer with a native surface
/// by implementing this instead, and the drawing code never sees the difference.
pub trait PixelStorage<T> {
    /// Discards the contents and makes room for exactly `len` elements
    fn reallocate(&mut self, len: usize);
    fn as_slice(&self) -> &[T];
    fn as_mut_slice(&mut self) -> &mut [T];
}
impl<T: Copy + Default> PixelStorage<T> for Vec<T> {
    fn reallocate(&mut self, len: usize) {
        self.clear();
        self.shrink_to(len);
        self.resize(len, T::default());
    }
    fn as_slice(&self) -> &[T] {
        self
    }
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

/// Mutable rows of a packed buffer
pub struct PackedRowsMut<'a> {
    pub depth: BitDepth,
    pub row_bytes: usize,
    pub data: &'a mut [u8],
}
impl<'a> PackedRowsMut<'a> {
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.row_bytes;
        &mut self.data[start..start + self.row_bytes]
    }
}

/// Mutable rows of a true color buffer, addressed by logical row whatever the storage order
pub struct ColorRowsMut<'a> {
    pub width: usize,
    pub height: usize,
    pub order: RowOrder,
    pub data: &'a mut [u32],
}
impl<'a> ColorRowsMut<'a> {
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u32] {
        let start = self.order.storage_row(y, self.height) * self.width;
        &mut self.data[start..start + self.width]
    }
}

/// Direct access to a buffer's pixels, one variant per storage format.
/// Hot loops match on this once and then run format-specific code.
pub enum PixelsMut<'a> {
    Packed(PackedRowsMut<'a>),
    TrueColor(ColorRowsMut<'a>),
    /// Storage this crate doesn't know how to address, e.g. a 16-bit native surface
    Unsupported { bits_per_pixel: u32 },
}

/// The drawing surface every buffer format exposes.
///
/// All writes are confined to the clip rectangle; out of range reads return 0.
/// Nothing here fails on bad geometry, it just draws less (or nothing).
pub trait DrawBuf {
    fn width(&self) -> Pixel;
    fn height(&self) -> Pixel;
    fn bits_per_pixel(&self) -> u32;

    /// Bytes per storage row
    fn row_bytes(&self) -> usize;

    fn clip_rect(&self) -> Rect;
    /// `None` resets the clip to the full buffer; a rectangle is clamped to the buffer bounds
    fn set_clip_rect(&mut self, clip: Option<Rect>);

    fn get_pixel(&self, x: Pixel, y: Pixel) -> Color;

    /// Fills the whole buffer, ignoring and then resetting the clip
    fn clear(&mut self, color: Color);

    /// Fills `[x0, x1) x [y0, y1)` intersected with the clip
    fn fill_rect(&mut self, x0: Pixel, y0: Pixel, x1: Pixel, y1: Pixel, color: Color);

    /// Reallocates for the new size, clears to black and resets the clip
    fn resize(&mut self, dx: Pixel, dy: Pixel);

    fn invert(&mut self);

    /// Converts the buffer to 1 bit per pixel in place, where that means anything for the format
    fn convert_to_bitmap(&mut self, dither: bool);

    /// Stamps a 1-byte-per-pixel mask (e.g. a glyph) with its top-left corner at `(x, y)`.
    /// `palette[0]` is the foreground color for formats that blend.
    #[allow(clippy::too_many_arguments)]
    fn draw_bitmap(
        &mut self,
        x: Pixel,
        y: Pixel,
        bitmap: &[u8],
        width: Pixel,
        height: Pixel,
        palette: &[Color],
    );

    fn pixels_mut(&mut self) -> PixelsMut<'_>;

    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Decodes `img` straight into the `width` by `height` box at `(x, y)`, rescaling as it goes
    fn draw_image(
        &mut self,
        img: &dyn ImageSource,
        x: Pixel,
        y: Pixel,
        width: Pixel,
        height: Pixel,
    ) -> Result<(), DrawError>
    where
        Self: Sized,
    {
        image::draw_image(self, img, x, y, width, height)
    }
}

/// Anything that knows how to put itself on a buffer
pub trait Drawable {
    fn draw_at(&self, buf: &mut dyn DrawBuf, position: Position);
}
