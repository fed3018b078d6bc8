use super::{ColorBuf, DrawBuf, Pixel, PixelStorage, PixelsMut};

impl<S: PixelStorage<u32>> ColorBuf<S> {
    /// Copies this buffer onto `dst` with its top-left corner at `(x, y)`, converting to `dst`'s format.
    ///
    /// Only destination pixels inside `dst`'s clip rectangle are touched.
    /// Packed destinations take the top 1 or 2 bits of each pixel's low byte and OR them in;
    /// nothing is ever cleared, so clear `dst` to 0 first for a plain copy.
    /// True color destinations get a straight copy.
    pub fn draw_to(&self, dst: &mut dyn DrawBuf, x: Pixel, y: Pixel) {
        let clip = dst.clip_rect();

        match dst.pixels_mut() {
            PixelsMut::Packed(mut rows) => {
                let depth = rows.depth;
                let drop = 8 - depth.bits();
                for yy in 0..self.height() {
                    if !clip.contains_y(y + yy) {
                        continue;
                    }
                    let Some(src) = self.scan_line(yy) else {
                        continue;
                    };
                    let row = rows.row_mut((y + yy) as usize);
                    for (xx, &px) in src.iter().enumerate() {
                        let dx = x + xx as Pixel;
                        if clip.contains_x(dx) {
                            depth.or(row, dx as usize, (px as u8) >> drop);
                        }
                    }
                }
            }
            PixelsMut::TrueColor(mut rows) => {
                for yy in 0..self.height() {
                    if !clip.contains_y(y + yy) {
                        continue;
                    }
                    let Some(src) = self.scan_line(yy) else {
                        continue;
                    };
                    let row = rows.row_mut((y + yy) as usize);
                    for (xx, &px) in src.iter().enumerate() {
                        let dx = x + xx as Pixel;
                        if clip.contains_x(dx) {
                            row[dx as usize] = px;
                        }
                    }
                }
            }
            PixelsMut::Unsupported { bits_per_pixel } => {
                log::warn!("can't blit into a {bits_per_pixel} bpp buffer");
            }
        }
    }
}
