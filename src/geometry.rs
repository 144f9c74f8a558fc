use crate::error::Error;

/// Coordinate components per point (x, y, z).
pub const COORDS_PER_POINT: usize = 3;

/// An ordered sequence of points in the map's projected coordinate
/// space, backed by a flat `f32` buffer.
///
/// The backing length is always a multiple of [`COORDS_PER_POINT`];
/// construction rejects anything else before any state changes, so a
/// `PointSet` never holds a partial point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    coords: Vec<f32>,
}

impl PointSet {
    /// Creates a point set from a flat `[x, y, z, x, y, z, ..]` buffer.
    ///
    /// # Errors
    /// [`Error::InvalidGeometry`] if the length is not a multiple of 3.
    pub fn new(coords: impl Into<Vec<f32>>) -> Result<Self, Error> {
        let coords = coords.into();
        if coords.len() % COORDS_PER_POINT != 0 {
            return Err(Error::coordinate_count_not_triples(coords.len()));
        }

        Ok(Self { coords })
    }

    /// Number of points.
    pub fn vertex_count(&self) -> usize {
        self.coords.len() / COORDS_PER_POINT
    }

    /// Bytes required to hold the coordinates on the device (the
    /// logical size, as opposed to the device buffer's capacity).
    pub fn byte_len(&self) -> usize {
        self.coords.len() * size_of::<f32>()
    }

    /// True when the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// The flat coordinate buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_whole_triples() {
        let points = PointSet::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(points.vertex_count(), 2);
        assert_eq!(points.byte_len(), 24);
    }

    #[test]
    fn test_rejects_partial_triples() {
        for len in [1, 2, 4, 5, 7] {
            let result = PointSet::new(vec![0.0; len]);
            assert!(
                matches!(result, Err(Error::InvalidGeometry(_))),
                "length {len} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_set_is_valid() {
        let points = PointSet::new(Vec::new()).unwrap();
        assert!(points.is_empty());
        assert_eq!(points.vertex_count(), 0);
        assert_eq!(points.byte_len(), 0);
    }
}
