use crate::algorithm::PackError;
use crate::Size;

/// Lazy, infinite stream of detail sizes, strictly non-increasing along
/// both axes. The stream also knows the dimensions of the sheet that
/// accommodates it in full.
pub trait DetailGenerator: Iterator<Item = Size> {
    /// dimensions of the base sheet; pure and idempotent
    fn base_size(&self) -> Size;
}

/// Squares with harmonically decreasing sides: the n-th emission is
/// (1/n, 1/n) starting at n0.
pub struct HarmonicSquares {
    n0: usize,
    denominator: usize,
}

impl HarmonicSquares {
    pub fn new(n0: usize) -> Result<Self, PackError> {
        match n0 {
            0 => Err(PackError::InvalidConfiguration(
                "n0 must be a positive integer".to_string(),
            )),
            _ => Ok(Self {
                n0,
                denominator: n0,
            }),
        }
    }
}

impl Iterator for HarmonicSquares {
    type Item = Size;
    fn next(&mut self) -> Option<Self::Item> {
        let side = 1.0 / self.denominator as f64;
        self.denominator += 1;
        Some((side, side))
    }
}

impl DetailGenerator for HarmonicSquares {
    /// side = sqrt(pi^2/6 - sum_{i<n0} 1/i^2), the area left by the tail of
    /// the Basel series
    fn base_size(&self) -> Size {
        let mut area = std::f64::consts::PI.powi(2) / 6.0;
        for i in 1..self.n0 {
            area -= (1.0 / i as f64).powi(2);
        }
        let side = area.sqrt();
        (side, side)
    }
}

/// Rectangles with harmonically decreasing sides: the n-th emission is
/// (1/(n+1), 1/n) or (1/n, 1/(n+1)) depending on which axis is smaller.
pub struct HarmonicRectangles {
    n0: usize,
    denominator: usize,
    width_is_smaller: bool,
}

impl HarmonicRectangles {
    pub fn new(n0: usize, width_is_smaller: bool) -> Result<Self, PackError> {
        match n0 {
            0 => Err(PackError::InvalidConfiguration(
                "n0 must be a positive integer".to_string(),
            )),
            _ => Ok(Self {
                n0,
                denominator: n0,
                width_is_smaller,
            }),
        }
    }
}

impl Iterator for HarmonicRectangles {
    type Item = Size;
    fn next(&mut self) -> Option<Self::Item> {
        let long = 1.0 / self.denominator as f64;
        let short = 1.0 / (self.denominator + 1) as f64;
        self.denominator += 1;
        match self.width_is_smaller {
            true => Some((short, long)),
            false => Some((long, short)),
        }
    }
}

impl DetailGenerator for HarmonicRectangles {
    fn base_size(&self) -> Size {
        let side = (1.0 / self.n0 as f64).sqrt();
        (side, side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_descend_harmonically() {
        let mut r#gen = HarmonicSquares::new(1).unwrap();
        assert!(r#gen.next() == Some((1.0, 1.0)));
        assert!(r#gen.next() == Some((0.5, 0.5)));
        assert!(r#gen.next() == Some((1.0 / 3.0, 1.0 / 3.0)));
    }

    #[test]
    fn squares_base_is_basel_tail() {
        let r#gen = HarmonicSquares::new(1).unwrap();
        let (w, h) = r#gen.base_size();
        assert!(w == h);
        assert!((w - (std::f64::consts::PI.powi(2) / 6.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn squares_base_is_pure() {
        let mut r#gen = HarmonicSquares::new(10).unwrap();
        let first = r#gen.base_size();
        r#gen.next();
        r#gen.next();
        assert!(r#gen.base_size() == first);
    }

    #[test]
    fn rectangles_respect_orientation() {
        let mut tall = HarmonicRectangles::new(5, true).unwrap();
        assert!(tall.next() == Some((1.0 / 6.0, 1.0 / 5.0)));
        let mut wide = HarmonicRectangles::new(5, false).unwrap();
        assert!(wide.next() == Some((1.0 / 5.0, 1.0 / 6.0)));
    }

    #[test]
    fn rectangles_base_is_square() {
        let r#gen = HarmonicRectangles::new(100, true).unwrap();
        assert!(r#gen.base_size() == (0.1, 0.1));
    }

    #[test]
    fn zero_n0_is_rejected() {
        assert!(HarmonicSquares::new(0).is_err());
        assert!(HarmonicRectangles::new(0, true).is_err());
    }
}
