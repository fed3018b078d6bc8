use super::{DrawBuf, DrawError, PackedRowsMut, Pixel, PixelStorage, PixelsMut};
use crate::graphics::{dither::dither_level_to_bit, Color};
use crate::layout::{clip_stamp, Rect};

/// Sample width of a packed buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitDepth {
    /// 1 bit per pixel, 8 pixels per byte, most significant bit leftmost
    Mono = 1,
    /// 2 bits per pixel, 4 pixels per byte, most significant pair leftmost
    Gray2 = 2,
}
impl BitDepth {
    pub fn from_bits(bpp: u32) -> Result<Self, DrawError> {
        match bpp {
            1 => Ok(BitDepth::Mono),
            2 => Ok(BitDepth::Gray2),
            other => Err(DrawError::UnsupportedDepth(other)),
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Highest storable level; also the lightest
    pub fn max_level(self) -> u8 {
        match self {
            BitDepth::Mono => 1,
            BitDepth::Gray2 => 3,
        }
    }

    /// `ceil(width * bpp / 8)`
    pub fn row_bytes(self, width: usize) -> usize {
        (width * self.bits() as usize + 7) / 8
    }

    /// The low `bpp` bits of `color` copied into every slot of a byte
    pub fn replicate(self, color: Color) -> u8 {
        match self {
            BitDepth::Mono => {
                if color & 1 != 0 {
                    0xFF
                } else {
                    0x00
                }
            }
            BitDepth::Gray2 => {
                let c = (color & 3) as u8;
                c | (c << 2) | (c << 4) | (c << 6)
            }
        }
    }

    /// Byte index and bit mask of pixel `x` within a row
    #[inline]
    pub fn locate(self, x: usize) -> (usize, u8) {
        match self {
            BitDepth::Mono => (x >> 3, 0x80 >> (x & 7)),
            BitDepth::Gray2 => (x >> 2, 0xC0 >> ((x & 3) << 1)),
        }
    }

    /// Right shift that brings pixel `x`'s sample down to the low bits
    #[inline]
    fn shift(self, x: usize) -> usize {
        match self {
            BitDepth::Mono => 7 - (x & 7),
            BitDepth::Gray2 => 6 - ((x & 3) << 1),
        }
    }

    #[inline]
    pub fn read(self, row: &[u8], x: usize) -> u8 {
        (row[(x * self.bits() as usize) >> 3] >> self.shift(x)) & self.max_level()
    }

    /// Overwrites pixel `x` with `level`
    #[inline]
    pub fn write(self, row: &mut [u8], x: usize, level: u8) {
        let (index, mask) = self.locate(x);
        row[index] = (row[index] & !mask) | ((level << self.shift(x)) & mask);
    }

    /// ORs `level` into pixel `x`, leaving anything already set
    #[inline]
    pub fn or(self, row: &mut [u8], x: usize, level: u8) {
        let (index, mask) = self.locate(x);
        row[index] |= (level << self.shift(x)) & mask;
    }
}

/// Gray draw buffer: 1 or 2 bits per pixel, rows packed into bytes.
///
/// Level 0 is black and [`BitDepth::max_level`] is white.
pub struct GrayBuf<S = Vec<u8>> {
    width: Pixel,
    height: Pixel,
    depth: BitDepth,
    row_bytes: usize,
    clip: Rect,
    data: S,
}

impl GrayBuf {
    pub fn new(dx: Pixel, dy: Pixel, depth: BitDepth) -> Self {
        Self::with_storage(dx, dy, depth, Vec::new())
    }

    /// Same as [`GrayBuf::new`] with the depth given as a raw bit count
    pub fn with_bits(dx: Pixel, dy: Pixel, bpp: u32) -> Result<Self, DrawError> {
        Ok(Self::new(dx, dy, BitDepth::from_bits(bpp)?))
    }
}

impl<S: PixelStorage<u8>> GrayBuf<S> {
    pub fn with_storage(dx: Pixel, dy: Pixel, depth: BitDepth, data: S) -> Self {
        let mut buf = Self {
            width: 0,
            height: 0,
            depth,
            row_bytes: 0,
            clip: Rect::default(),
            data,
        };
        buf.resize(dx, dy);
        buf
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    /// Raw packed rows, `row_bytes * height` long
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn scan_line(&self, y: Pixel) -> Option<&[u8]> {
        if y < 0 || y >= self.height {
            return None;
        }
        let start = y as usize * self.row_bytes;
        self.data.as_slice().get(start..start + self.row_bytes)
    }

    fn scan_line_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.row_bytes;
        &mut self.data.as_mut_slice()[start..start + self.row_bytes]
    }

    /// Expands row `y` into `out` as `0x00RRGGBB`, looking levels up in `palette`
    /// (or the default black-to-white ramp when `None`).
    /// Writes at most `min(width, out.len())` pixels.
    pub fn render_rgb_row(&self, y: Pixel, palette: Option<&[Color]>, out: &mut [u32]) {
        let Some(row) = self.scan_line(y) else {
            return;
        };
        let palette = palette.unwrap_or_else(|| default_palette(self.depth));
        for (x, px) in out.iter_mut().take(self.width as usize).enumerate() {
            let level = self.depth.read(row, x) as usize;
            *px = palette.get(level).copied().unwrap_or(0) & 0xFFFFFF;
        }
    }

    /// The whole buffer expanded through [`GrayBuf::render_rgb_row`]
    pub fn to_rgb(&self, palette: Option<&[Color]>) -> Vec<u32> {
        let width = self.width as usize;
        let mut out = vec![0; width * self.height as usize];
        if width == 0 {
            return out;
        }
        for (y, row) in out.chunks_mut(width).enumerate() {
            self.render_rgb_row(y as Pixel, palette, row);
        }
        out
    }
}

const PALETTE_1BPP: [Color; 2] = [0x000000, 0xFFFFFF];
const PALETTE_2BPP: [Color; 4] = [0x000000, 0x555555, 0xAAAAAA, 0xFFFFFF];

/// Black-to-white ramp matching the level polarity
pub fn default_palette(depth: BitDepth) -> &'static [Color] {
    match depth {
        BitDepth::Mono => &PALETTE_1BPP,
        BitDepth::Gray2 => &PALETTE_2BPP,
    }
}

impl<S: PixelStorage<u8>> DrawBuf for GrayBuf<S> {
    fn width(&self) -> Pixel {
        self.width
    }
    fn height(&self) -> Pixel {
        self.height
    }
    fn bits_per_pixel(&self) -> u32 {
        self.depth.bits()
    }
    fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    fn clip_rect(&self) -> Rect {
        self.clip
    }
    fn set_clip_rect(&mut self, clip: Option<Rect>) {
        let bounds = Rect::from_size(self.size());
        self.clip = clip.map_or(bounds, |clip| clip.clamp_to(self.size()));
    }

    fn get_pixel(&self, x: Pixel, y: Pixel) -> Color {
        if x < 0 || x >= self.width {
            return 0;
        }
        self.scan_line(y)
            .map_or(0, |row| self.depth.read(row, x as usize) as Color)
    }

    fn clear(&mut self, color: Color) {
        let fill = self.depth.replicate(color);
        self.data.as_mut_slice().fill(fill);
        self.set_clip_rect(None);
    }

    fn fill_rect(&mut self, x0: Pixel, y0: Pixel, x1: Pixel, y1: Pixel, color: Color) {
        let area = Rect::new(x0, y0, x1, y1).intersect(&self.clip);
        if area.is_empty() {
            return;
        }
        let depth = self.depth;
        let fill = depth.replicate(color);
        for y in area.top..area.bottom {
            let row = self.scan_line_mut(y as usize);
            for x in area.left..area.right {
                let (index, mask) = depth.locate(x as usize);
                row[index] = (row[index] & !mask) | (fill & mask);
            }
        }
    }

    fn resize(&mut self, dx: Pixel, dy: Pixel) {
        self.width = dx.max(0);
        self.height = dy.max(0);
        self.row_bytes = self.depth.row_bytes(self.width as usize);
        self.data.reallocate(self.row_bytes * self.height as usize);
        log::debug!(
            "gray buffer resized to {}x{} at {} bpp ({} bytes)",
            self.width,
            self.height,
            self.depth.bits(),
            self.row_bytes * self.height as usize
        );
        self.clear(0);
    }

    fn invert(&mut self) {
        self.data
            .as_mut_slice()
            .iter_mut()
            .for_each(|byte| *byte = !*byte);
    }

    fn convert_to_bitmap(&mut self, dither: bool) {
        if self.depth == BitDepth::Mono {
            return;
        }
        let width = self.width as usize;
        let height = self.height as usize;
        let row_bytes = BitDepth::Mono.row_bytes(width);
        let mut bitmap = vec![0u8; row_bytes * height];

        for (y, dst) in bitmap.chunks_mut(row_bytes.max(1)).enumerate().take(height) {
            let start = y * self.row_bytes;
            let src = &self.data.as_slice()[start..start + self.row_bytes];
            for x in 0..width {
                let level = BitDepth::Gray2.read(src, x);
                let bit = if dither {
                    dither_level_to_bit(level, x, y)
                } else {
                    level >> 1
                };
                BitDepth::Mono.or(dst, x, bit);
            }
        }

        self.data.reallocate(bitmap.len());
        self.data.as_mut_slice().copy_from_slice(&bitmap);
        self.depth = BitDepth::Mono;
        self.row_bytes = row_bytes;
        log::debug!("gray buffer converted to 1 bpp (dither: {dither})");
    }

    fn draw_bitmap(
        &mut self,
        x: Pixel,
        y: Pixel,
        bitmap: &[u8],
        width: Pixel,
        height: Pixel,
        _palette: &[Color],
    ) {
        if width <= 0 || height <= 0 {
            return;
        }
        let stride = width as usize;
        if bitmap.len() < stride * height as usize {
            log::warn!(
                "stamp bitmap has {} bytes, {}x{} needs {}",
                bitmap.len(),
                width,
                height,
                stride * height as usize
            );
            return;
        }
        let Some(region) = clip_stamp(self.clip, x, y, width, height) else {
            return;
        };

        let depth = self.depth;
        // top `bpp` bits of each mask byte, moved down to the low bits
        let drop = 8 - depth.bits();
        for row_index in 0..region.height {
            let src_start = (region.src_y + row_index) * stride + region.src_x;
            let src = &bitmap[src_start..src_start + region.width];
            let row = self.scan_line_mut(region.y as usize + row_index);
            for (i, &coverage) in src.iter().enumerate() {
                depth.or(row, region.x as usize + i, coverage >> drop);
            }
        }
    }

    fn pixels_mut(&mut self) -> PixelsMut<'_> {
        PixelsMut::Packed(PackedRowsMut {
            depth: self.depth,
            row_bytes: self.row_bytes,
            data: self.data.as_mut_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Size;

    fn levels(buf: &GrayBuf) -> Vec<Color> {
        (0..buf.height())
            .flat_map(|y| (0..buf.width()).map(move |x| (x, y)))
            .map(|(x, y)| buf.get_pixel(x, y))
            .collect()
    }

    #[test]
    fn row_bytes_round_up() {
        assert_eq!(GrayBuf::new(9, 2, BitDepth::Mono).row_bytes(), 2);
        assert_eq!(GrayBuf::new(9, 2, BitDepth::Gray2).row_bytes(), 3);
        assert_eq!(GrayBuf::new(8, 2, BitDepth::Gray2).data().len(), 4);
    }

    #[test]
    fn clear_truncates_color_to_depth() {
        let mut buf = GrayBuf::new(13, 3, BitDepth::Gray2);
        buf.clear(0x0E);
        assert!(levels(&buf).iter().all(|&l| l == 2));

        let mut buf = GrayBuf::new(13, 3, BitDepth::Mono);
        buf.clear(3);
        assert!(levels(&buf).iter().all(|&l| l == 1));
        // every byte, including the first one
        assert!(buf.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn clear_resets_clip() {
        let mut buf = GrayBuf::new(8, 8, BitDepth::Mono);
        buf.set_clip_rect(Some(Rect::new(2, 2, 4, 4)));
        buf.clear(0);
        assert_eq!(buf.clip_rect(), Rect::new(0, 0, 8, 8));
    }

    #[test]
    fn out_of_bounds_reads_are_zero() {
        let mut buf = GrayBuf::new(4, 4, BitDepth::Gray2);
        buf.clear(3);
        assert_eq!(buf.get_pixel(-1, 0), 0);
        assert_eq!(buf.get_pixel(4, 0), 0);
        assert_eq!(buf.get_pixel(0, 4), 0);
        assert_eq!(buf.get_pixel(3, 3), 3);
    }

    #[test]
    fn set_clip_is_clamped() {
        let mut buf = GrayBuf::new(10, 6, BitDepth::Mono);
        buf.set_clip_rect(Some(Rect::new(-3, 2, 40, 50)));
        assert_eq!(buf.clip_rect(), Rect::new(0, 2, 10, 6));
    }

    #[test]
    fn fill_rect_respects_clip_2bpp() {
        let mut buf = GrayBuf::new(6, 5, BitDepth::Gray2);
        buf.set_clip_rect(Some(Rect::new(1, 1, 5, 4)));
        buf.fill_rect(-10, 2, 3, 10, 2);
        for y in 0..5 {
            for x in 0..6 {
                let expected = if (1..3).contains(&x) && (2..4).contains(&y) {
                    2
                } else {
                    0
                };
                assert_eq!(buf.get_pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn fill_rect_is_idempotent() {
        let mut once = GrayBuf::new(11, 4, BitDepth::Mono);
        once.fill_rect(3, 1, 9, 3, 1);
        let mut twice = GrayBuf::new(11, 4, BitDepth::Mono);
        twice.fill_rect(3, 1, 9, 3, 1);
        twice.fill_rect(3, 1, 9, 3, 1);
        assert_eq!(once.data(), twice.data());
    }

    #[test]
    fn empty_fill_is_noop() {
        let mut buf = GrayBuf::new(4, 4, BitDepth::Mono);
        buf.fill_rect(3, 3, 1, 1, 1);
        buf.fill_rect(5, 0, 9, 4, 1);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn invert_twice_restores() {
        let mut buf = GrayBuf::new(7, 3, BitDepth::Gray2);
        buf.fill_rect(1, 0, 5, 2, 1);
        let before = buf.data().to_vec();
        buf.invert();
        assert_ne!(buf.data(), &before[..]);
        assert_eq!(buf.get_pixel(0, 0), 3);
        assert_eq!(buf.get_pixel(1, 0), 2);
        buf.invert();
        assert_eq!(buf.data(), &before[..]);
    }

    #[test]
    fn invert_ignores_clip() {
        let mut buf = GrayBuf::new(4, 4, BitDepth::Mono);
        buf.set_clip_rect(Some(Rect::new(1, 1, 2, 2)));
        buf.invert();
        assert!(levels(&buf).iter().all(|&l| l == 1));
    }

    #[test]
    fn resize_reallocates_and_clears() {
        let mut buf = GrayBuf::new(4, 4, BitDepth::Gray2);
        buf.clear(3);
        buf.set_clip_rect(Some(Rect::new(1, 1, 2, 2)));
        buf.resize(10, 3);
        assert_eq!(buf.size(), Size::new(10, 3));
        assert_eq!(buf.row_bytes(), 3);
        assert_eq!(buf.data().len(), 9);
        assert_eq!(buf.clip_rect(), Rect::new(0, 0, 10, 3));
        assert!(levels(&buf).iter().all(|&l| l == 0));
    }

    #[test]
    fn zero_size_buffer_is_inert() {
        let mut buf = GrayBuf::new(0, 0, BitDepth::Gray2);
        buf.clear(3);
        buf.fill_rect(0, 0, 10, 10, 3);
        buf.draw_bitmap(0, 0, &[0xFF], 1, 1, &[]);
        buf.invert();
        buf.convert_to_bitmap(true);
        assert_eq!(buf.get_pixel(0, 0), 0);
        assert!(buf.data().is_empty());
    }

    #[test]
    fn convert_keeps_top_bit() {
        let mut buf = GrayBuf::new(5, 2, BitDepth::Gray2);
        buf.clear(1);
        buf.fill_rect(0, 0, 3, 2, 2);
        buf.convert_to_bitmap(false);
        assert_eq!(buf.depth(), BitDepth::Mono);
        assert_eq!(buf.bits_per_pixel(), 1);
        assert_eq!(buf.row_bytes(), 1);
        assert_eq!(levels(&buf), vec![1, 1, 1, 0, 0, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn convert_with_dither_spreads_mid_levels() {
        let mut buf = GrayBuf::new(4, 2, BitDepth::Gray2);
        buf.clear(2);
        buf.convert_to_bitmap(true);
        // level 2 maps to a checkerboard
        assert_eq!(levels(&buf), vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn convert_is_noop_for_mono() {
        let mut buf = GrayBuf::new(9, 2, BitDepth::Mono);
        buf.fill_rect(0, 0, 4, 1, 1);
        let before = buf.data().to_vec();
        buf.convert_to_bitmap(true);
        assert_eq!(buf.data(), &before[..]);
    }

    #[test]
    fn stamp_ors_top_bits() {
        let mut buf = GrayBuf::new(8, 2, BitDepth::Gray2);
        buf.fill_rect(0, 0, 8, 2, 1);
        #[rustfmt::skip]
        let mask = [
            0xC0, 0x80, 0x40, 0x00,
            0xFF, 0x3F, 0x7F, 0xBF,
        ];
        buf.draw_bitmap(2, 0, &mask, 4, 2, &[]);
        assert_eq!(levels(&buf)[..8], [1, 1, 3, 3, 1, 1, 1, 1]);
        assert_eq!(levels(&buf)[8..], [1, 1, 3, 1, 1, 3, 1, 1]);
    }

    #[test]
    fn stamp_is_clipped_on_every_edge() {
        let mut buf = GrayBuf::new(4, 4, BitDepth::Mono);
        buf.set_clip_rect(Some(Rect::new(1, 1, 3, 3)));
        let mask = [0xFF; 16];
        buf.draw_bitmap(-1, -1, &mask, 4, 4, &[]);
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0, 0,
            0, 1, 1, 0,
            0, 1, 1, 0,
            0, 0, 0, 0,
        ];
        assert_eq!(levels(&buf), expected);
    }

    #[test]
    fn stamp_uses_source_offset_after_clipping() {
        let mut buf = GrayBuf::new(2, 1, BitDepth::Mono);
        // only the last column of the mask is set
        let mask = [0x00, 0x00, 0x80];
        buf.draw_bitmap(-2, 0, &mask, 3, 1, &[]);
        assert_eq!(levels(&buf), vec![1, 0]);
    }

    #[test_log::test]
    fn short_stamp_is_rejected() {
        let mut buf = GrayBuf::new(4, 4, BitDepth::Mono);
        buf.draw_bitmap(0, 0, &[0xFF; 3], 2, 2, &[]);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn with_bits_rejects_other_depths() {
        assert!(GrayBuf::with_bits(4, 4, 2).is_ok());
        assert_eq!(
            GrayBuf::with_bits(4, 4, 4).err(),
            Some(DrawError::UnsupportedDepth(4))
        );
    }

    #[test]
    fn rgb_expansion_uses_polarity() {
        let mut buf = GrayBuf::new(4, 1, BitDepth::Gray2);
        for x in 0..4 {
            buf.fill_rect(x, 0, x + 1, 1, x as Color);
        }
        assert_eq!(
            buf.to_rgb(None),
            vec![0x000000, 0x555555, 0xAAAAAA, 0xFFFFFF]
        );
        let custom = [0x112233, 0, 0, 0x445566];
        let mut row = [0u32; 2];
        buf.render_rgb_row(0, Some(&custom), &mut row);
        assert_eq!(row, [0x112233, 0]);
    }
}
