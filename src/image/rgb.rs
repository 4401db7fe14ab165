//! Owned 8-bit RGB image used for rank colour overlays.
use super::{ImageSize, ImageView, ImageViewMut};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRgb8 {
    pub w: usize,
    pub h: usize,
    pub data: Vec<[u8; 3]>,
}

impl ImageRgb8 {
    /// Black image of the given size.
    pub fn new(size: ImageSize) -> Self {
        Self {
            w: size.width,
            h: size.height,
            data: vec![[0; 3]; size.area()],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        self.data[y * self.w + x]
    }

    /// Flatten into interleaved `RGBRGB…` bytes.
    pub fn to_raw(&self) -> Vec<u8> {
        self.data.iter().flat_map(|px| px.iter().copied()).collect()
    }
}

impl ImageView for ImageRgb8 {
    type Pixel = [u8; 3];

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.w
    }
    #[inline]
    fn row(&self, y: usize) -> &[[u8; 3]] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[[u8; 3]]> {
        Some(&self.data)
    }
}

impl ImageViewMut for ImageRgb8 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [[u8; 3]] {
        let start = y * self.w;
        &mut self.data[start..start + self.w]
    }
}
