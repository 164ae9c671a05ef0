//! Weight domains used to score matches.
//!
//! Every algorithm in this crate is generic over a [`Semiring`]: a value type equipped with an
//! additive operation [`Semiring::plus`] that combines the weights of alternative paths, and a
//! multiplicative operation [`Semiring::times`] that combines the weights of consecutive steps of
//! a single path. The choice of semiring determines the meaning of a match score:
//!
//! | Semiring   | `plus` | `times` | `zero` | `one` |
//! |------------|--------|---------|--------|-------|
//! | [`Boolean`]| or     | and     | false  | true  |
//! | [`MinPlus`]| min    | +       | +∞     | 0     |
//! | [`MaxPlus`]| max    | +       | -∞     | 0     |
//! | [`MaxMin`] | max    | min     | -∞     | +∞    |
//!
//! The operators from [`std::ops`] are implemented for each provided weight so that expressions
//! read like arithmetic:
//!
//! ```rust
//! use qtpm_core::semiring::{MaxMin, Semiring};
//!
//! let a = MaxMin(3.0);
//! let b = MaxMin(5.0);
//!
//! assert_eq!(a + b, MaxMin(5.0));  // plus is max
//! assert_eq!(a * b, MaxMin(3.0));  // times is min
//! assert_eq!(a + MaxMin::zero(), a);
//! ```
//!
//! Real valued weights are compared using the total ordering of [`OrderedFloat`], so they can be
//! used as hash keys.

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Mul, MulAssign};

use ordered_float::OrderedFloat;

/// Trait representing the algebraic structure of a match weight.
///
/// Implementations must satisfy the semiring laws: `plus` and `times` are associative, `plus` is
/// commutative, `zero` is the identity of `plus` and absorbing for `times`, `one` is the identity
/// of `times`, and `times` distributes over `plus`.
///
/// The generalized shortest path algorithms in [`shortest_path`](crate::shortest_path) terminate
/// only if relaxing along a cycle cannot improve a weight forever. This is a requirement on the
/// chosen semiring and is not checked at runtime.
pub trait Semiring: Clone + PartialEq {
    /// The additive identity. Represents "no match".
    ///
    /// # Example
    ///
    /// ```rust
    /// use qtpm_core::semiring::{MinPlus, Semiring};
    /// let zero = MinPlus::zero();  // MinPlus(f64::INFINITY)
    /// ```
    fn zero() -> Self;

    /// The multiplicative identity. Represents an empty, neutral step.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qtpm_core::semiring::{MinPlus, Semiring};
    /// let one = MinPlus::one();  // MinPlus(0.0)
    /// ```
    fn one() -> Self;

    /// Combine the weights of two alternatives.
    fn plus(&self, other: &Self) -> Self;

    /// Combine the weights of two consecutive steps.
    fn times(&self, other: &Self) -> Self;

    /// Returns `true` if this weight is the additive identity.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Trait representing a semiring with a Kleene closure operation.
///
/// The closure `a*` is the infinite sum `one + a + a·a + a·a·a + ...` and is used by the
/// all-pairs algorithm [`warshall_floyd`](crate::shortest_path::warshall_floyd) to summarize
/// cycles.
pub trait StarSemiring: Semiring {
    /// Compute the closure of this weight.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qtpm_core::semiring::{MinPlus, StarSemiring};
    ///
    /// assert_eq!(MinPlus(-2.0).star(), MinPlus(f64::NEG_INFINITY));
    /// assert_eq!(MinPlus(2.0).star(), MinPlus(0.0));
    /// ```
    fn star(&self) -> Self;
}

/// Boolean semiring where `plus` is disjunction and `times` is conjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Boolean(pub bool);

impl Semiring for Boolean {
    fn zero() -> Self {
        Boolean(false)
    }

    fn one() -> Self {
        Boolean(true)
    }

    fn plus(&self, other: &Self) -> Self {
        Boolean(self.0 || other.0)
    }

    fn times(&self, other: &Self) -> Self {
        Boolean(self.0 && other.0)
    }
}

impl StarSemiring for Boolean {
    fn star(&self) -> Self {
        Self::one()
    }
}

/// A robustness value is satisfied when it is strictly positive.
impl From<f64> for Boolean {
    fn from(value: f64) -> Self {
        Boolean(value > 0.0)
    }
}

impl Display for Boolean {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self.0 { 1.0 } else { 0.0 })
    }
}

macro_rules! real_semiring {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name(pub f64);

        impl $name {
            /// The underlying real value.
            pub fn value(&self) -> f64 {
                self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                OrderedFloat(self.0) == OrderedFloat(other.0)
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                OrderedFloat(self.0).hash(state)
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                $name(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }
    };
}

real_semiring! {
    /// Tropical semiring: alternatives are combined with `min`, steps are summed.
    MinPlus
}

real_semiring! {
    /// Arctic semiring: alternatives are combined with `max`, steps are summed.
    MaxPlus
}

real_semiring! {
    /// Bottleneck semiring: alternatives are combined with `max`, steps with `min`.
    ///
    /// This is the usual space robustness of signal temporal logic, a path is as robust as its
    /// least robust step and a match is as robust as its most robust path.
    MaxMin
}

impl Semiring for MinPlus {
    fn zero() -> Self {
        MinPlus(f64::INFINITY)
    }

    fn one() -> Self {
        MinPlus(0.0)
    }

    fn plus(&self, other: &Self) -> Self {
        MinPlus(f64::min(self.0, other.0))
    }

    fn times(&self, other: &Self) -> Self {
        MinPlus(self.0 + other.0)
    }
}

impl StarSemiring for MinPlus {
    fn star(&self) -> Self {
        if self.0 < 0.0 {
            MinPlus(f64::NEG_INFINITY)
        } else {
            Self::one()
        }
    }
}

impl Semiring for MaxPlus {
    fn zero() -> Self {
        MaxPlus(f64::NEG_INFINITY)
    }

    fn one() -> Self {
        MaxPlus(0.0)
    }

    fn plus(&self, other: &Self) -> Self {
        MaxPlus(f64::max(self.0, other.0))
    }

    fn times(&self, other: &Self) -> Self {
        MaxPlus(self.0 + other.0)
    }
}

impl StarSemiring for MaxPlus {
    fn star(&self) -> Self {
        if self.0 > 0.0 {
            MaxPlus(f64::INFINITY)
        } else {
            Self::one()
        }
    }
}

impl Semiring for MaxMin {
    fn zero() -> Self {
        MaxMin(f64::NEG_INFINITY)
    }

    fn one() -> Self {
        MaxMin(f64::INFINITY)
    }

    fn plus(&self, other: &Self) -> Self {
        MaxMin(f64::max(self.0, other.0))
    }

    fn times(&self, other: &Self) -> Self {
        MaxMin(f64::min(self.0, other.0))
    }
}

impl StarSemiring for MaxMin {
    fn star(&self) -> Self {
        Self::one()
    }
}

macro_rules! semiring_ops {
    ($($name:ident),*) => {
        $(
            impl Add for $name {
                type Output = $name;

                fn add(self, rhs: Self) -> Self::Output {
                    self.plus(&rhs)
                }
            }

            impl AddAssign for $name {
                fn add_assign(&mut self, rhs: Self) {
                    *self = self.plus(&rhs);
                }
            }

            impl Mul for $name {
                type Output = $name;

                fn mul(self, rhs: Self) -> Self::Output {
                    self.times(&rhs)
                }
            }

            impl MulAssign for $name {
                fn mul_assign(&mut self, rhs: Self) {
                    *self = self.times(&rhs);
                }
            }
        )*
    };
}

semiring_ops!(Boolean, MinPlus, MaxPlus, MaxMin);

#[cfg(test)]
mod tests {
    use super::{Boolean, MaxMin, MaxPlus, MinPlus, Semiring, StarSemiring};

    fn check_laws<W>(values: &[W])
    where
        W: Semiring + std::fmt::Debug,
    {
        for a in values {
            assert_eq!(a.plus(&W::zero()), *a);
            assert_eq!(a.times(&W::one()), *a);
            assert_eq!(W::one().times(a), *a);
            assert_eq!(a.times(&W::zero()), W::zero());

            for b in values {
                assert_eq!(a.plus(b), b.plus(a));

                for c in values {
                    assert_eq!(a.plus(b).plus(c), a.plus(&b.plus(c)));
                    assert_eq!(a.times(b).times(c), a.times(&b.times(c)));
                    assert_eq!(a.times(&b.plus(c)), a.times(b).plus(&a.times(c)));
                }
            }
        }
    }

    #[test]
    fn boolean_laws() {
        check_laws(&[Boolean(false), Boolean(true)]);
    }

    #[test]
    fn min_plus_laws() {
        check_laws(&[MinPlus(-3.0), MinPlus(0.0), MinPlus(2.0), MinPlus(7.0)]);
    }

    #[test]
    fn max_plus_laws() {
        check_laws(&[MaxPlus(-3.0), MaxPlus(0.0), MaxPlus(2.0), MaxPlus(7.0)]);
    }

    #[test]
    fn max_min_laws() {
        check_laws(&[MaxMin(-3.0), MaxMin(0.0), MaxMin(2.0), MaxMin(7.0), MaxMin::one()]);
    }

    #[test]
    fn min_plus() {
        assert_eq!(MinPlus(3.0) + MinPlus(5.0), MinPlus(3.0));
        assert_eq!(MinPlus(3.0) * MinPlus(5.0), MinPlus(8.0));
        assert_eq!(MinPlus(-2.0).star(), MinPlus(f64::NEG_INFINITY));
        assert_eq!(MinPlus(2.0).star(), MinPlus::one());
    }

    #[test]
    fn max_plus() {
        assert_eq!(MaxPlus(3.0) + MaxPlus(5.0), MaxPlus(5.0));
        assert_eq!(MaxPlus(3.0) * MaxPlus(5.0), MaxPlus(8.0));
        assert_eq!(MaxPlus(2.0).star(), MaxPlus(f64::INFINITY));
        assert_eq!(MaxPlus(-2.0).star(), MaxPlus::one());
    }

    #[test]
    fn max_min() {
        let mut w = MaxMin(3.0);
        w += MaxMin(5.0);
        assert_eq!(w, MaxMin(5.0));

        w *= MaxMin(-1.0);
        assert_eq!(w, MaxMin(-1.0));
        assert_eq!(MaxMin::one(), MaxMin(f64::INFINITY));
    }

    #[test]
    fn boolean_from_robustness() {
        assert_eq!(Boolean::from(0.5), Boolean(true));
        assert_eq!(Boolean::from(0.0), Boolean(false));
        assert_eq!(Boolean::from(-4.0), Boolean(false));
    }

    #[test]
    fn zero_detection() {
        assert!(MaxMin::zero().is_zero());
        assert!(!MaxMin(1.0).is_zero());
        assert!(MinPlus(f64::INFINITY).is_zero());
    }
}
