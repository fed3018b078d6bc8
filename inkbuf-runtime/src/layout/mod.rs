use crate::render::Pixel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Size {
    pub width: Pixel,
    pub height: Pixel,
}
impl Size {
    pub fn new(width: Pixel, height: Pixel) -> Self {
        Self { width, height }
    }
}

/// Position from the top left of the buffer.
/// Signed, since callers routinely place things partly off-surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    pub x: Pixel,
    pub y: Pixel,
}
impl Position {
    pub fn new(x: Pixel, y: Pixel) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, half-open: `left..right` by `top..bottom`.
///
/// Every buffer carries one of these as its clip rectangle.
/// For a clip the invariant is `0 <= left <= right <= width` (and the same for the vertical axis);
/// [`Rect::clamp_to`] is what establishes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: Pixel,
    pub top: Pixel,
    pub right: Pixel,
    pub bottom: Pixel,
}
impl Rect {
    pub fn new(left: Pixel, top: Pixel, right: Pixel, bottom: Pixel) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Full bounds of a `width` by `height` surface
    pub fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn width(&self) -> Pixel {
        self.right - self.left
    }
    pub fn height(&self) -> Pixel {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    #[inline]
    pub fn contains(&self, x: Pixel, y: Pixel) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    #[inline]
    pub fn contains_x(&self, x: Pixel) -> bool {
        x >= self.left && x < self.right
    }
    #[inline]
    pub fn contains_y(&self, y: Pixel) -> bool {
        y >= self.top && y < self.bottom
    }

    /// Overlap of the two rectangles; may come out empty (or even inverted), check with [`Rect::is_empty`].
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            left: Pixel::max(self.left, other.left),
            top: Pixel::max(self.top, other.top),
            right: Pixel::min(self.right, other.right),
            bottom: Pixel::min(self.bottom, other.bottom),
        }
    }

    /// Clamps the edges into `[0, size.width] x [0, size.height]`.
    /// The result is never inverted: an out-of-range rectangle collapses to an empty one.
    pub fn clamp_to(&self, size: Size) -> Rect {
        let left = self.left.clamp(0, size.width);
        let top = self.top.clamp(0, size.height);
        Rect {
            left,
            top,
            right: self.right.clamp(left, size.width),
            bottom: self.bottom.clamp(top, size.height),
        }
    }
}

/// The part of a 1-byte-per-pixel stamp bitmap that survives clipping,
/// and where it lands on the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StampRegion {
    /// Destination origin, already inside the clip
    pub x: Pixel,
    pub y: Pixel,
    /// Offset into the source bitmap
    pub src_x: usize,
    pub src_y: usize,
    pub width: usize,
    pub height: usize,
}

/// Clips a `width` by `height` stamp placed at `(x, y)` against `clip`, edge by edge.
///
/// A left or top overhang trims the same amount off both the source offset and the extent;
/// right and bottom overhangs only trim the extent.
/// Returns `None` when nothing is left to draw.
pub fn clip_stamp(
    clip: Rect,
    mut x: Pixel,
    mut y: Pixel,
    mut width: Pixel,
    mut height: Pixel,
) -> Option<StampRegion> {
    let mut src_x = 0;
    let mut src_y = 0;

    if x < clip.left {
        let overhang = clip.left.saturating_sub(x);
        width = width.saturating_sub(overhang);
        src_x = overhang;
        x = clip.left;
    }
    if y < clip.top {
        let overhang = clip.top.saturating_sub(y);
        height = height.saturating_sub(overhang);
        src_y = overhang;
        y = clip.top;
    }
    if x.saturating_add(width) > clip.right {
        width = clip.right.saturating_sub(x);
    }
    if y.saturating_add(height) > clip.bottom {
        height = clip.bottom.saturating_sub(y);
    }
    if width <= 0 || height <= 0 {
        return None;
    }

    Some(StampRegion {
        x,
        y,
        src_x: src_x as usize,
        src_y: src_y as usize,
        width: width as usize,
        height: height as usize,
    })
}
