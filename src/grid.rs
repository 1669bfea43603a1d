//! Lazy Cartesian-product parameter sweeps.
//!
//! A [`ParameterGrid`] is a list of named axes. Its points are enumerated in
//! row-major order (the last axis varies fastest) without materialising the
//! product, and every point carries its flat index so parallel sweeps can
//! derive per-point random streams and reassemble results in order.

use crate::errors::{validate_finite, HarnessError, HarnessResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One named sweep dimension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridAxis {
    pub name: String,
    pub values: Vec<f64>,
}

/// Cartesian product of named axes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterGrid {
    axes: Vec<GridAxis>,
}

/// A single point of a [`ParameterGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    /// Position in row-major enumeration order
    pub index: usize,
    /// Index into each axis
    pub indices: Vec<usize>,
    /// Value taken on each axis
    pub values: Vec<f64>,
}

impl GridPoint {
    /// Value on axis `axis`.
    pub fn value(&self, axis: usize) -> f64 {
        self.values[axis]
    }
}

impl ParameterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis.
    ///
    /// # Errors
    /// `InvalidParameter` for an empty axis, a non-finite value or a
    /// duplicate axis name.
    pub fn axis(mut self, name: &str, values: &[f64]) -> HarnessResult<Self> {
        if values.is_empty() {
            return Err(HarnessError::InvalidParameter {
                parameter: name.to_string(),
                value: 0.0,
                constraint: "axis needs at least one value".to_string(),
            });
        }
        if self.axis_position(name).is_some() {
            return Err(HarnessError::InvalidParameter {
                parameter: name.to_string(),
                value: f64::NAN,
                constraint: "axis names must be unique".to_string(),
            });
        }
        for &v in values {
            validate_finite(v, name)?;
        }
        self.axes.push(GridAxis {
            name: name.to_string(),
            values: values.to_vec(),
        });
        Ok(self)
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    /// Position of the axis called `name`.
    pub fn axis_position(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }

    /// Number of points; zero for a grid without axes.
    pub fn len(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().map(|a| a.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point at flat `index`, or `None` past the end.
    pub fn point(&self, index: usize) -> Option<GridPoint> {
        if index >= self.len() {
            return None;
        }
        let mut indices = vec![0; self.axes.len()];
        let mut rest = index;
        for (slot, axis) in indices.iter_mut().zip(&self.axes).rev() {
            *slot = rest % axis.values.len();
            rest /= axis.values.len();
        }
        let values = indices
            .iter()
            .zip(&self.axes)
            .map(|(&i, axis)| axis.values[i])
            .collect();
        Some(GridPoint {
            index,
            indices,
            values,
        })
    }

    /// Lazy row-major iterator over the points.
    pub fn iter(&self) -> GridIter<'_> {
        GridIter {
            grid: self,
            next: 0,
            len: self.len(),
        }
    }
}

/// Iterator returned by [`ParameterGrid::iter`].
#[derive(Debug, Clone)]
pub struct GridIter<'a> {
    grid: &'a ParameterGrid,
    next: usize,
    len: usize,
}

impl Iterator for GridIter<'_> {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        if self.next >= self.len {
            return None;
        }
        let point = self.grid.point(self.next);
        self.next += 1;
        point
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridIter<'_> {}

impl<'a> IntoIterator for &'a ParameterGrid {
    type Item = GridPoint;
    type IntoIter = GridIter<'a>;

    fn into_iter(self) -> GridIter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_order() {
        let grid = ParameterGrid::new()
            .axis("theta", &[0.0, 0.6, -0.6])
            .unwrap()
            .axis("alpha", &[1.0, 3.0])
            .unwrap();
        assert_eq!(grid.len(), 6);
        let values: Vec<Vec<f64>> = grid.iter().map(|p| p.values).collect();
        assert_eq!(
            values,
            vec![
                vec![0.0, 1.0],
                vec![0.0, 3.0],
                vec![0.6, 1.0],
                vec![0.6, 3.0],
                vec![-0.6, 1.0],
                vec![-0.6, 3.0],
            ]
        );
        let last = grid.point(5).unwrap();
        assert_eq!(last.indices, vec![2, 1]);
        assert_eq!(last.index, 5);
        assert!(grid.point(6).is_none());
    }

    #[test]
    fn test_iterator_is_exact_size() {
        let grid = ParameterGrid::new().axis("c", &[0.0, 1.0, 2.0]).unwrap();
        let mut iter = grid.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
        assert_eq!((&grid).into_iter().count(), 3);
    }

    #[test]
    fn test_empty_and_invalid_axes() {
        assert!(ParameterGrid::new().is_empty());
        assert!(ParameterGrid::new().axis("c", &[]).is_err());
        assert!(ParameterGrid::new().axis("c", &[f64::NAN]).is_err());
        let grid = ParameterGrid::new().axis("c", &[1.0]).unwrap();
        assert!(grid.clone().axis("c", &[2.0]).is_err());
        assert_eq!(grid.axis_position("c"), Some(0));
        assert_eq!(grid.axis_position("alpha"), None);
    }
}
