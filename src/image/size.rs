use serde::{Deserialize, Serialize};
use std::fmt;

/// Image dimensions in pixels, `(height, width)` like the detector outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub height: usize,
    pub width: usize,
}

impl ImageSize {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
