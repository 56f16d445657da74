use super::gradient::GradientField;

/// A pixel that takes part in the voting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePixel {
    /// Column of the pixel.
    pub x: usize,
    /// Row of the pixel.
    pub y: usize,
    /// Gradient direction in radians, in `[0, 2π)`.
    pub direction: f32,
}

/// Edge pixels in row-major order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSet {
    pixels: Vec<EdgePixel>,
}

impl EdgeSet {
    /// Number of edge pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether no pixel passed the threshold.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Edge pixels as a slice.
    pub fn as_slice(&self) -> &[EdgePixel] {
        &self.pixels
    }

    /// Iterate over the edge pixels.
    pub fn iter(&self) -> std::slice::Iter<'_, EdgePixel> {
        self.pixels.iter()
    }
}

impl From<Vec<EdgePixel>> for EdgeSet {
    fn from(pixels: Vec<EdgePixel>) -> Self {
        Self { pixels }
    }
}

/// Keep every interior pixel whose gradient magnitude reaches `param1 / 2`.
///
/// There is no edge linking and no thinning, the lower threshold alone decides.
pub fn select_edges(gradient: &GradientField, param1: f32) -> EdgeSet {
    let size = gradient.size();
    let low_threshold = param1 / 2.0;

    let pixels = gradient
        .samples()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.magnitude > 0.0 && s.magnitude >= low_threshold)
        .map(|(idx, s)| EdgePixel {
            x: idx % size.width,
            y: idx / size.width,
            direction: s.direction,
        })
        .filter(|p| {
            p.x > 0 && p.y > 0 && p.x + 1 < size.width && p.y + 1 < size.height
        })
        .collect();

    EdgeSet { pixels }
}
