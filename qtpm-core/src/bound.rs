use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Neg, Sub};

use ordered_float::OrderedFloat;

/// Upper bound on a clock difference.
///
/// A bound is either closed, meaning `x - y ≤ value`, or open, meaning `x - y < value`. Bounds are
/// ordered by value first, and for equal values an open bound is smaller than a closed one since
/// it admits fewer valuations.
///
/// ```rust
/// use qtpm_core::Bound;
///
/// assert!(Bound::open(2.0) < Bound::closed(2.0));
/// assert!(Bound::closed(2.0) < Bound::open(3.0));
/// assert_eq!(Bound::closed(1.0) + Bound::open(2.0), Bound::open(3.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Bound {
    pub value: f64,
    pub closed: bool,
}

impl Bound {
    /// The absence of a bound.
    pub const INFINITY: Bound = Bound {
        value: f64::INFINITY,
        closed: false,
    };

    /// The bound `≤ 0`.
    pub const ZERO: Bound = Bound {
        value: 0.0,
        closed: true,
    };

    pub fn new(value: f64, closed: bool) -> Self {
        Self { value, closed }
    }

    /// Create the bound `≤ value`.
    pub fn closed(value: f64) -> Self {
        Self::new(value, true)
    }

    /// Create the bound `< value`.
    pub fn open(value: f64) -> Self {
        Self::new(value, false)
    }

    pub fn is_infinite(&self) -> bool {
        self.value == f64::INFINITY
    }

    /// Infinite bounds compare equal whatever their strictness.
    fn key(&self) -> (OrderedFloat<f64>, bool) {
        (OrderedFloat(self.value), self.closed && self.value.is_finite())
    }
}

impl PartialEq for Bound {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Bound {}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Bound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

/// Sum of two bounds. An unbounded operand makes the sum unbounded.
impl Add for Bound {
    type Output = Bound;

    fn add(self, rhs: Self) -> Self::Output {
        if self.is_infinite() || rhs.is_infinite() {
            return Bound::INFINITY;
        }

        Bound::new(self.value + rhs.value, self.closed && rhs.closed)
    }
}

/// Shift the value of the bound.
impl Add<f64> for Bound {
    type Output = Bound;

    fn add(self, rhs: f64) -> Self::Output {
        Bound::new(self.value + rhs, self.closed)
    }
}

impl Sub<f64> for Bound {
    type Output = Bound;

    fn sub(self, rhs: f64) -> Self::Output {
        Bound::new(self.value - rhs, self.closed)
    }
}

/// Bound for the complement of the constraint, i.e. `x - y ≤ c` becomes `y - x < -c`.
impl Neg for Bound {
    type Output = Bound;

    fn neg(self) -> Self::Output {
        Bound::new(-self.value, !self.closed)
    }
}

impl Display for Bound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let op = if self.closed { "<=" } else { "<" };
        write!(f, "{} {}", op, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::Bound;

    #[test]
    fn ordering() {
        assert!(Bound::open(0.0) < Bound::ZERO);
        assert!(Bound::ZERO < Bound::open(0.5));
        assert!(Bound::closed(1e9) < Bound::INFINITY);
        assert_eq!(Bound::closed(3.0).max(Bound::open(3.0)), Bound::closed(3.0));
    }

    #[test]
    fn addition() {
        assert_eq!(Bound::closed(1.0) + Bound::closed(2.0), Bound::closed(3.0));
        assert_eq!(Bound::closed(1.0) + Bound::open(-2.0), Bound::open(-1.0));
        assert_eq!(Bound::INFINITY + Bound::closed(-5.0), Bound::INFINITY);
        assert_eq!(Bound::INFINITY + Bound::new(f64::NEG_INFINITY, false), Bound::INFINITY);
    }

    #[test]
    fn infinite_bounds_ignore_strictness() {
        assert_eq!(Bound::closed(f64::INFINITY), Bound::INFINITY);
        assert_eq!(Bound::closed(f64::NEG_INFINITY), Bound::open(f64::NEG_INFINITY));
        assert!(Bound::closed(f64::NEG_INFINITY) < Bound::open(-1e9));
        assert!(Bound::closed(5.0) < Bound::closed(f64::INFINITY));
    }

    #[test]
    fn complement() {
        assert_eq!(-Bound::closed(2.0), Bound::open(-2.0));
        assert_eq!(-Bound::open(-1.0), Bound::closed(1.0));
    }
}
