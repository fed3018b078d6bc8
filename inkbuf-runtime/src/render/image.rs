//! Streaming image compositing.
//!
//! An [`ImageSource`] decodes itself one scan line at a time into an [`ImageDecoderCallback`].
//! [`ScaledDrawCallback`] is the callback that lands those lines on a buffer:
//! nearest-neighbor scaling, clipping and per-format compositing happen line by line,
//! so the whole source image is never held in memory.

use super::{ColorRowsMut, DrawBuf, DrawError, Drawable, PackedRowsMut, Pixel, PixelsMut};
use crate::graphics::{
    alpha, apply_alpha_rgb,
    dither::{dither_1bit_color, dither_2bit_color},
    Color,
};
use crate::layout::{Position, Rect};
use crate::render::gray::BitDepth;

/// Receives decoded lines.
///
/// A decoder calls `on_start_decode` once, then `on_line_decoded` once per row top to bottom,
/// then `on_end_decode` once, all before `decode` returns.
pub trait ImageDecoderCallback {
    fn on_start_decode(&mut self, _width: Pixel, _height: Pixel) {}

    /// `data` holds the row as `0xAARRGGBB` with 0 alpha meaning opaque.
    /// An error stops decoding.
    fn on_line_decoded(&mut self, y: Pixel, data: &[Color]) -> Result<(), DrawError>;

    fn on_end_decode(&mut self, _errors: bool) {}
}

pub trait ImageSource {
    fn width(&self) -> Pixel;
    fn height(&self) -> Pixel;
    fn decode(&self, callback: &mut dyn ImageDecoderCallback) -> Result<(), DrawError>;
}

/// A fully decoded image held in memory, row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    width: Pixel,
    height: Pixel,
    pixels: Vec<Color>,
}
impl RgbaImage {
    /// `None` unless `pixels` holds exactly `width * height` colors
    pub fn new(width: Pixel, height: Pixel, pixels: Vec<Color>) -> Option<Self> {
        if width < 0 || height < 0 || pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_fn(width: Pixel, height: Pixel, f: impl Fn(Pixel, Pixel) -> Color) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
}
impl ImageSource for RgbaImage {
    fn width(&self) -> Pixel {
        self.width
    }
    fn height(&self) -> Pixel {
        self.height
    }

    fn decode(&self, callback: &mut dyn ImageDecoderCallback) -> Result<(), DrawError> {
        callback.on_start_decode(self.width, self.height);
        let width = self.width as usize;
        let result = (0..self.height).try_for_each(|y| {
            let start = y as usize * width;
            callback.on_line_decoded(y, &self.pixels[start..start + width])
        });
        callback.on_end_decode(result.is_err());
        result
    }
}
impl Drawable for RgbaImage {
    fn draw_at(&self, buf: &mut dyn DrawBuf, position: Position) {
        if let Err(err) = draw_image(buf, self, position.x, position.y, self.width, self.height) {
            log::warn!("image not drawn: {err}");
        }
    }
}

/// `dst_index * src_len / dst_len` for every destination index
fn gen_map(src_len: Pixel, dst_len: Pixel) -> Vec<usize> {
    (0..dst_len as i64)
        .map(|i| (i * src_len as i64 / dst_len as i64) as usize)
        .collect()
}

/// Where the image goes and how source pixels map onto it
struct Placement {
    dst_x: Pixel,
    dst_y: Pixel,
    dst_dx: Pixel,
    dst_dy: Pixel,
    src_dx: Pixel,
    src_dy: Pixel,
    /// Destination column to source column; `None` at 1:1
    xmap: Option<Vec<usize>>,
    scale_rows: bool,
}

impl Placement {
    /// Destination rows (relative to the box) covered by source row `y`, as a half-open range
    fn dest_rows(&self, y: Pixel) -> (Pixel, Pixel) {
        if !self.scale_rows {
            return (y, y + 1);
        }
        let scale = |row: Pixel| (row as i64 * self.dst_dy as i64 / self.src_dy as i64) as Pixel;
        let yy = scale(y);
        // A downscaled row landing on the previous row's destination could be skipped here.
        // Drawing it again is harmless and skipping changes which source row wins, so it stays drawn.
        if yy == scale(y - 1) {
            log::trace!("source row {y} repeats destination row {yy}");
        }
        (yy, Pixel::min(scale(y + 1), self.dst_dy))
    }

    #[inline]
    fn source_column(&self, x: usize) -> usize {
        self.xmap.as_ref().map_or(x, |map| map[x])
    }

    fn composite_true_color(&self, rows: &mut ColorRowsMut, clip: Rect, yy: Pixel, data: &[Color]) {
        let row = rows.row_mut((yy + self.dst_y) as usize);
        for x in 0..self.dst_dx {
            let xx = x + self.dst_x;
            if !clip.contains_x(xx) {
                continue;
            }
            let cl = data[self.source_column(x as usize)];
            match alpha(cl) {
                0 => row[xx as usize] = cl,
                0xFF => {}
                a => apply_alpha_rgb(&mut row[xx as usize], cl, a),
            }
        }
    }

    /// Dithers at the source pixel `(column, y)`, so a pixel enlarged into a block stays one level
    fn composite_packed(
        &self,
        rows: &mut PackedRowsMut,
        clip: Rect,
        yy: Pixel,
        y: Pixel,
        data: &[Color],
    ) {
        let depth = rows.depth;
        let row = rows.row_mut((yy + self.dst_y) as usize);
        for x in 0..self.dst_dx {
            let xx = x + self.dst_x;
            if !clip.contains_x(xx) {
                continue;
            }
            let column = self.source_column(x as usize);
            let cl = data[column];
            // no partial transparency at these depths
            if alpha(cl) & 0x80 != 0 {
                continue;
            }
            let level = match depth {
                BitDepth::Gray2 => dither_2bit_color(cl, column as u32, y as u32),
                BitDepth::Mono => dither_1bit_color(cl, column as u32, y as u32),
            };
            depth.write(row, xx as usize, level as u8);
        }
    }
}

/// Composites decoded lines into a `width` by `height` box at `(x, y)` on a buffer.
///
/// The column map is built once up front; rows are mapped arithmetically,
/// so one source row can fan out to several destination rows when enlarging.
pub struct ScaledDrawCallback<'a> {
    dst: &'a mut dyn DrawBuf,
    placement: Placement,
}

impl<'a> ScaledDrawCallback<'a> {
    pub fn new(
        dst: &'a mut dyn DrawBuf,
        src_dx: Pixel,
        src_dy: Pixel,
        x: Pixel,
        y: Pixel,
        width: Pixel,
        height: Pixel,
    ) -> Self {
        Self {
            dst,
            placement: Placement {
                dst_x: x,
                dst_y: y,
                dst_dx: width,
                dst_dy: height,
                src_dx,
                src_dy,
                xmap: (src_dx != width).then(|| gen_map(src_dx, width)),
                scale_rows: src_dy != height,
            },
        }
    }
}

impl<'a> ImageDecoderCallback for ScaledDrawCallback<'a> {
    fn on_line_decoded(&mut self, y: Pixel, data: &[Color]) -> Result<(), DrawError> {
        let Self { dst, placement } = self;
        if placement.src_dx <= 0 || placement.src_dy <= 0 {
            return Ok(());
        }

        let needed = placement.src_dx as usize;
        if data.len() < needed {
            return Err(DrawError::RowTooShort {
                row: y,
                expected: needed,
                actual: data.len(),
            });
        }

        let (first, end) = placement.dest_rows(y);
        let clip = dst.clip_rect();
        let rows = (first..end).filter(|yy| clip.contains_y(yy + placement.dst_y));

        match dst.pixels_mut() {
            PixelsMut::TrueColor(mut pixels) => {
                rows.for_each(|yy| placement.composite_true_color(&mut pixels, clip, yy, data));
                Ok(())
            }
            PixelsMut::Packed(mut pixels) => {
                rows.for_each(|yy| placement.composite_packed(&mut pixels, clip, yy, y, data));
                Ok(())
            }
            PixelsMut::Unsupported { bits_per_pixel } => {
                log::warn!("can't composite an image into a {bits_per_pixel} bpp buffer");
                Err(DrawError::UnsupportedDepth(bits_per_pixel))
            }
        }
    }
}

/// Decodes `img` into the `width` by `height` box at `(x, y)` on `dst`.
///
/// An empty box or an empty image draws nothing and succeeds.
pub fn draw_image(
    dst: &mut dyn DrawBuf,
    img: &dyn ImageSource,
    x: Pixel,
    y: Pixel,
    width: Pixel,
    height: Pixel,
) -> Result<(), DrawError> {
    let (src_dx, src_dy) = (img.width(), img.height());
    if width <= 0 || height <= 0 || src_dx <= 0 || src_dy <= 0 {
        log::debug!("skipping empty image draw ({src_dx}x{src_dy} into {width}x{height})");
        return Ok(());
    }
    let mut callback = ScaledDrawCallback::new(dst, src_dx, src_dy, x, y, width, height);
    img.decode(&mut callback)
}
