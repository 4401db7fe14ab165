//! Owned binary mask raster in row-major layout (stride == width).
//!
//! Detector outputs are stored as `0`/`255` bytes, but every reader in the
//! crate treats any non-zero byte as foreground.
use super::{ImageSize, ImageU8, ImageView};

pub const FOREGROUND: u8 = 255;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskU8 {
    /// Mask width in pixels
    pub w: usize,
    /// Mask height in pixels
    pub h: usize,
    /// Backing storage in row-major order
    pub data: Vec<u8>,
}

impl MaskU8 {
    /// Construct an all-background mask of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    pub fn with_size(size: ImageSize) -> Self {
        Self::new(size.width, size.height)
    }

    /// Wrap raw bytes; returns `None` when `data.len() != w * h`.
    pub fn from_raw(w: usize, h: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == w * h).then_some(Self { w, h, data })
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut mask = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                if f(x, y) {
                    mask.data[y * w + x] = FOREGROUND;
                }
            }
        }
        mask
    }

    /// Copy a borrowed view into an owned mask, normalising foreground to 255.
    pub fn from_view(view: &ImageU8<'_>) -> Self {
        let mut mask = Self::new(view.w, view.h);
        for (y, row) in view.rows().enumerate() {
            let out = &mut mask.data[y * view.w..(y + 1) * view.w];
            for (dst, &src) in out.iter_mut().zip(row) {
                *dst = if src != 0 { FOREGROUND } else { 0 };
            }
        }
        mask
    }

    #[inline]
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.h, self.w)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, foreground: bool) {
        self.data[y * self.w + x] = if foreground { FOREGROUND } else { 0 };
    }

    /// Mark the half-open rectangle `[x1, x2) × [y1, y2)` as foreground,
    /// clipped to the mask.
    pub fn fill_rect(&mut self, x1: usize, y1: usize, x2: usize, y2: usize) {
        let x2 = x2.min(self.w);
        let y2 = y2.min(self.h);
        for y in y1.min(y2)..y2 {
            for x in x1.min(x2)..x2 {
                self.data[y * self.w + x] = FOREGROUND;
            }
        }
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// OR another mask of the same size into this one. Returns `false` and
    /// leaves `self` untouched when the sizes differ.
    pub fn union_with(&mut self, other: &MaskU8) -> bool {
        if self.size() != other.size() {
            return false;
        }
        for (dst, &src) in self.data.iter_mut().zip(&other.data) {
            if src != 0 {
                *dst = FOREGROUND;
            }
        }
        true
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8::packed(self.w, self.h, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_clipped_to_the_mask() {
        let mut mask = MaskU8::new(4, 3);
        mask.fill_rect(2, 1, 10, 10);
        assert_eq!(mask.foreground_count(), 4);
        assert!(mask.get(3, 2));
        assert!(!mask.get(1, 1));
    }

    #[test]
    fn union_rejects_mismatched_sizes() {
        let mut a = MaskU8::new(4, 4);
        let b = MaskU8::from_fn(4, 4, |x, _| x == 0);
        let c = MaskU8::new(2, 2);
        assert!(a.union_with(&b));
        assert!(!a.union_with(&c));
        assert_eq!(a.foreground_count(), 4);
    }

    #[test]
    fn from_view_normalises_nonzero_bytes() {
        let raw = [0u8, 1, 7, 0];
        let view = ImageU8::packed(2, 2, &raw);
        let mask = MaskU8::from_view(&view);
        assert_eq!(mask.data, vec![0, FOREGROUND, FOREGROUND, 0]);
    }
}
