use super::{ColorRowsMut, DrawBuf, Pixel, PixelStorage, PixelsMut};
use crate::graphics::{apply_opacity_nibble, Color, BLACK};
use crate::layout::{clip_stamp, Rect};

/// How logical rows map onto storage rows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RowOrder {
    #[default]
    TopDown,
    /// Last logical row first, as native bottom-up bitmaps store it
    BottomUp,
}
impl RowOrder {
    #[inline]
    pub fn storage_row(self, y: usize, height: usize) -> usize {
        match self {
            RowOrder::TopDown => y,
            RowOrder::BottomUp => height - 1 - y,
        }
    }
}

/// True color draw buffer, one `0xAARRGGBB` word per pixel
pub struct ColorBuf<S = Vec<u32>> {
    width: Pixel,
    height: Pixel,
    order: RowOrder,
    clip: Rect,
    data: S,
}

impl ColorBuf {
    pub fn new(dx: Pixel, dy: Pixel) -> Self {
        Self::with_storage(dx, dy, RowOrder::TopDown, Vec::new())
    }
}

impl<S: PixelStorage<u32>> ColorBuf<S> {
    pub fn with_storage(dx: Pixel, dy: Pixel, order: RowOrder, data: S) -> Self {
        let mut buf = Self {
            width: 0,
            height: 0,
            order,
            clip: Rect::default(),
            data,
        };
        buf.resize(dx, dy);
        buf
    }

    pub fn row_order(&self) -> RowOrder {
        self.order
    }

    /// Storage in storage order, `width * height` words
    pub fn data(&self) -> &[u32] {
        self.data.as_slice()
    }

    /// Pixels of logical row `y`
    pub fn scan_line(&self, y: Pixel) -> Option<&[u32]> {
        if y < 0 || y >= self.height {
            return None;
        }
        let width = self.width as usize;
        let start = self.order.storage_row(y as usize, self.height as usize) * width;
        self.data.as_slice().get(start..start + width)
    }

    fn scan_line_mut(&mut self, y: usize) -> &mut [u32] {
        let width = self.width as usize;
        let start = self.order.storage_row(y, self.height as usize) * width;
        &mut self.data.as_mut_slice()[start..start + width]
    }
}

impl<S: PixelStorage<u32>> DrawBuf for ColorBuf<S> {
    fn width(&self) -> Pixel {
        self.width
    }
    fn height(&self) -> Pixel {
        self.height
    }
    fn bits_per_pixel(&self) -> u32 {
        32
    }
    fn row_bytes(&self) -> usize {
        self.width as usize * 4
    }

    fn clip_rect(&self) -> Rect {
        self.clip
    }
    fn set_clip_rect(&mut self, clip: Option<Rect>) {
        let bounds = Rect::from_size(self.size());
        self.clip = clip.map_or(bounds, |clip| clip.clamp_to(self.size()));
    }

    fn get_pixel(&self, x: Pixel, y: Pixel) -> Color {
        if x < 0 {
            return 0;
        }
        self.scan_line(y)
            .and_then(|row| row.get(x as usize).copied())
            .unwrap_or(0)
    }

    fn clear(&mut self, color: Color) {
        self.data.as_mut_slice().fill(color);
        self.set_clip_rect(None);
    }

    fn fill_rect(&mut self, x0: Pixel, y0: Pixel, x1: Pixel, y1: Pixel, color: Color) {
        let area = Rect::new(x0, y0, x1, y1).intersect(&self.clip);
        if area.is_empty() {
            return;
        }
        for y in area.top..area.bottom {
            self.scan_line_mut(y as usize)[area.left as usize..area.right as usize].fill(color);
        }
    }

    fn resize(&mut self, dx: Pixel, dy: Pixel) {
        if dx > 0 && dy > 0 {
            self.width = dx;
            self.height = dy;
        } else {
            self.width = 0;
            self.height = 0;
        }
        self.data
            .reallocate(self.width as usize * self.height as usize);
        log::debug!(
            "color buffer resized to {}x{} ({:?})",
            self.width,
            self.height,
            self.order
        );
        self.set_clip_rect(None);
    }

    /// Does nothing: inverting a true color surface has no use here
    fn invert(&mut self) {}

    /// Does nothing; true color only goes down to packed formats through [`ColorBuf::draw_to`]
    fn convert_to_bitmap(&mut self, _dither: bool) {}

    fn draw_bitmap(
        &mut self,
        x: Pixel,
        y: Pixel,
        bitmap: &[u8],
        width: Pixel,
        height: Pixel,
        palette: &[Color],
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
        let foreground = palette.first().copied().unwrap_or(BLACK);

        for row_index in 0..region.height {
            let src_start = (region.src_y + row_index) * stride + region.src_x;
            let src = &bitmap[src_start..src_start + region.width];
            let x0 = region.x as usize;
            let row = self.scan_line_mut(region.y as usize + row_index);
            for (dst, &coverage) in row[x0..x0 + region.width].iter_mut().zip(src) {
                apply_opacity_nibble(dst, foreground, (coverage >> 4) as u32 & 15);
            }
        }
    }

    fn pixels_mut(&mut self) -> PixelsMut<'_> {
        PixelsMut::TrueColor(ColorRowsMut {
            width: self.width as usize,
            height: self.height as usize,
            order: self.order,
            data: self.data.as_mut_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::WHITE;

    #[test]
    fn clear_then_read_back() {
        let mut buf = ColorBuf::new(3, 2);
        buf.clear(0x00123456);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buf.get_pixel(x, y), 0x00123456);
            }
        }
        assert_eq!(buf.get_pixel(3, 0), 0);
        assert_eq!(buf.get_pixel(0, -1), 0);
    }

    #[test]
    fn new_buffer_is_black_with_full_clip() {
        let buf = ColorBuf::new(4, 5);
        assert!(buf.data().iter().all(|&px| px == 0));
        assert_eq!(buf.clip_rect(), Rect::new(0, 0, 4, 5));
        assert_eq!(buf.row_bytes(), 16);
        assert_eq!(buf.bits_per_pixel(), 32);
    }

    #[test]
    fn fill_rect_within_clip() {
        let mut buf = ColorBuf::new(4, 4);
        buf.set_clip_rect(Some(Rect::new(0, 1, 3, 4)));
        buf.fill_rect(2, -5, 9, 2, 0xABCDEF);
        assert_eq!(buf.get_pixel(2, 1), 0xABCDEF);
        assert_eq!(buf.get_pixel(2, 0), 0);
        assert_eq!(buf.get_pixel(3, 1), 0);
        assert_eq!(buf.get_pixel(1, 1), 0);
        assert_eq!(buf.get_pixel(2, 2), 0);
    }

    #[test]
    fn invert_and_convert_are_noops() {
        let mut buf = ColorBuf::new(2, 2);
        buf.clear(0x102030);
        buf.invert();
        buf.convert_to_bitmap(true);
        assert_eq!(buf.bits_per_pixel(), 32);
        assert!(buf.data().iter().all(|&px| px == 0x102030));
    }

    #[test]
    fn resize_to_zero_is_inert() {
        let mut buf = ColorBuf::new(4, 4);
        buf.resize(0, 7);
        assert_eq!((buf.width(), buf.height()), (0, 0));
        buf.fill_rect(0, 0, 4, 4, WHITE);
        buf.draw_bitmap(0, 0, &[0xF0], 1, 1, &[WHITE]);
        assert_eq!(buf.get_pixel(0, 0), 0);
        assert!(buf.data().is_empty());
    }

    #[test]
    fn bottom_up_storage_keeps_logical_rows() {
        let mut buf = ColorBuf::with_storage(2, 3, RowOrder::BottomUp, Vec::<u32>::new());
        buf.fill_rect(0, 0, 2, 1, 0x111111);
        assert_eq!(buf.get_pixel(1, 0), 0x111111);
        assert_eq!(buf.scan_line(0), Some(&[0x111111, 0x111111][..]));
        // first logical row lives at the end of storage
        assert_eq!(&buf.data()[4..], &[0x111111, 0x111111]);
        assert_eq!(&buf.data()[..2], &[0, 0]);
    }

    #[test]
    fn opaque_stamp_writes_foreground() {
        let mut buf = ColorBuf::new(1, 1);
        buf.clear(WHITE);
        buf.draw_bitmap(0, 0, &[0xF0], 1, 1, &[0x000000]);
        assert_eq!(buf.get_pixel(0, 0), 0x000000);
    }

    #[test]
    fn faint_stamp_is_skipped_and_mid_stamp_blends() {
        let mut buf = ColorBuf::new(2, 1);
        buf.clear(WHITE);
        buf.draw_bitmap(0, 0, &[0x30, 0x80], 2, 1, &[0x000000]);
        assert_eq!(buf.get_pixel(0, 0), WHITE);
        // 7/16 of white
        assert_eq!(buf.get_pixel(1, 0), 0x6F6F6F);
    }

    #[test]
    fn stamp_without_palette_uses_black() {
        let mut buf = ColorBuf::new(1, 1);
        buf.clear(WHITE);
        buf.draw_bitmap(0, 0, &[0xFF], 1, 1, &[]);
        assert_eq!(buf.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn stamp_clipped_left_and_top() {
        let mut buf = ColorBuf::new(3, 3);
        #[rustfmt::skip]
        let mask = [
            0xF0, 0x00,
            0x00, 0xF0,
        ];
        buf.draw_bitmap(-1, -1, &mask, 2, 2, &[WHITE]);
        assert_eq!(buf.get_pixel(0, 0), WHITE);
        assert_eq!(buf.get_pixel(1, 0), 0);
        assert_eq!(buf.get_pixel(0, 1), 0);
    }
}
