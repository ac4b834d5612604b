//! Core raster types

use serde::{Deserialize, Serialize};

/// Represents raster dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Creates new dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns whether a sub-pixel position lies on the raster (edges inclusive)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x <= self.width as f64 && y <= self.height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let dims = Dimensions::new(100, 200);
        assert_eq!(dims.width, 100);
        assert_eq!(dims.height, 200);
        assert!(!dims.is_empty());
    }

    #[test]
    fn test_dimensions_contains() {
        let dims = Dimensions::new(500, 500);
        assert!(dims.contains(0.0, 0.0));
        assert!(dims.contains(500.0, 500.0));
        assert!(!dims.contains(-0.5, 10.0));
        assert!(!dims.contains(10.0, 500.5));
        assert!(Dimensions::new(0, 10).is_empty());
    }
}
