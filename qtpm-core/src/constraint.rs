//! Atomic comparisons of a single variable against an integer constant.
//!
//! The same [`Constraint`] type is used for two purposes. On transitions of a timed automaton the
//! variable is a clock and the constraint becomes a cell of a [`Zone`](crate::Zone). On locations
//! the variable is a signal and the constraint is scored against sampled values by the
//! [`robustness`](crate::robustness) functions.
//!
//! ```rust
//! use qtpm_core::constraint::{Constraint, Guard};
//!
//! let label = Guard::from([Constraint::gt(0, 100), Constraint::lt(1, 30)]);
//!
//! assert_eq!(label.to_string(), "{x0 > 100, x1 < 30}");
//! assert!(label.constraints().all(|c| c.is_satisfied(&[130.0, 20.0])));
//! ```

use std::fmt::{Display, Formatter};

use crate::bound::Bound;
use crate::zone::{Clock, Zone};

/// Comparison operator of a [`Constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Lt,
    Le,
    Ge,
    Gt,
}

impl Order {
    /// Returns `true` for the operators that bound the variable from above.
    pub fn is_upper(&self) -> bool {
        matches!(self, Order::Lt | Order::Le)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Order::Lt | Order::Gt)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Order::Lt => "<",
            Order::Le => "<=",
            Order::Ge => ">=",
            Order::Gt => ">",
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The comparison `x<var> <order> <constant>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub var: usize,
    pub order: Order,
    pub constant: i64,
}

impl Constraint {
    pub fn new(var: usize, order: Order, constant: i64) -> Self {
        Self { var, order, constant }
    }

    /// Create the constraint `x<var> < constant`.
    pub fn lt(var: usize, constant: i64) -> Self {
        Self::new(var, Order::Lt, constant)
    }

    /// Create the constraint `x<var> <= constant`.
    pub fn le(var: usize, constant: i64) -> Self {
        Self::new(var, Order::Le, constant)
    }

    /// Create the constraint `x<var> >= constant`.
    pub fn ge(var: usize, constant: i64) -> Self {
        Self::new(var, Order::Ge, constant)
    }

    /// Create the constraint `x<var> > constant`.
    pub fn gt(var: usize, constant: i64) -> Self {
        Self::new(var, Order::Gt, constant)
    }

    /// Check the constraint against the values of the variables.
    ///
    /// # Panics
    ///
    /// Panics if `values` has no entry for the variable of the constraint.
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let value = values[self.var];
        let constant = self.constant as f64;

        match self.order {
            Order::Lt => value < constant,
            Order::Le => value <= constant,
            Order::Ge => value >= constant,
            Order::Gt => value > constant,
        }
    }

    /// Distance of `value` to the boundary of the constraint, positive when satisfied.
    pub fn robustness(&self, value: f64) -> f64 {
        let constant = self.constant as f64;

        if self.order.is_upper() {
            constant - value
        } else {
            value - constant
        }
    }

    /// The zone cell `(x, y)` and bound such that `x - y ≤ bound` is this constraint on a clock.
    pub fn as_difference(&self) -> (Clock, Clock, Bound) {
        let closed = !self.order.is_strict();
        let constant = self.constant as f64;

        if self.order.is_upper() {
            (Clock::Var(self.var), Clock::Zero, Bound::new(constant, closed))
        } else {
            (Clock::Zero, Clock::Var(self.var), Bound::new(-constant, closed))
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{} {} {}", self.var, self.order, self.constant)
    }
}

/// A conjunction of constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Guard(Vec<Constraint>);

impl FromIterator<Constraint> for Guard {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Constraint>,
    {
        Self(Vec::from_iter(iter))
    }
}

impl<const N: usize> From<[Constraint; N]> for Guard {
    fn from(constraints: [Constraint; N]) -> Self {
        Self(Vec::from(constraints))
    }
}

impl From<Vec<Constraint>> for Guard {
    fn from(constraints: Vec<Constraint>) -> Self {
        Self(constraints)
    }
}

#[derive(Debug)]
pub struct Constraints<'a>(std::slice::Iter<'a, Constraint>);

impl<'a> Iterator for Constraints<'a> {
    type Item = &'a Constraint;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl Guard {
    /// The guard without constraints, which is always satisfied.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constraints(&self) -> Constraints<'_> {
        Constraints(self.0.iter())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove the lower bounds of the guard.
    pub fn widen(&self) -> Guard {
        self.constraints().filter(|c| c.order.is_upper()).copied().collect()
    }

    /// Tighten `zone` by every constraint of the guard, interpreting the variables as clocks.
    ///
    /// The zone is left without closure.
    pub fn restrict(&self, zone: &mut Zone) {
        for constraint in self.constraints() {
            let (x, y, bound) = constraint.as_difference();
            zone.tighten_without_close(x, y, bound);
        }
    }

    /// Greatest variable index used by the guard.
    pub fn max_var(&self) -> Option<usize> {
        self.constraints().map(|c| c.var).max()
    }

    /// Greatest constant used by the guard.
    pub fn max_constant(&self) -> Option<i64> {
        self.constraints().map(|c| c.constant).max()
    }
}

impl Display for Guard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;

        for (i, constraint) in self.constraints().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{}", constraint)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::{Constraint, Guard, Order};
    use crate::bound::Bound;
    use crate::zone::{Clock, Zone};

    #[test]
    fn differences() {
        assert_eq!(
            Constraint::lt(0, 3).as_difference(),
            (Clock::Var(0), Clock::Zero, Bound::open(3.0))
        );
        assert_eq!(
            Constraint::le(1, 3).as_difference(),
            (Clock::Var(1), Clock::Zero, Bound::closed(3.0))
        );
        assert_eq!(
            Constraint::gt(0, 3).as_difference(),
            (Clock::Zero, Clock::Var(0), Bound::open(-3.0))
        );
        assert_eq!(
            Constraint::ge(2, 3).as_difference(),
            (Clock::Zero, Clock::Var(2), Bound::closed(-3.0))
        );
    }

    #[test]
    fn satisfaction() {
        let values = [1.0, 5.0];

        assert!(Constraint::lt(0, 2).is_satisfied(&values));
        assert!(!Constraint::lt(1, 5).is_satisfied(&values));
        assert!(Constraint::le(1, 5).is_satisfied(&values));
        assert!(Constraint::ge(1, 5).is_satisfied(&values));
        assert!(!Constraint::gt(0, 1).is_satisfied(&values));
    }

    #[test]
    fn robustness() {
        assert_eq!(Constraint::gt(0, 100).robustness(130.0), 30.0);
        assert_eq!(Constraint::lt(1, 30).robustness(20.0), 10.0);
        assert_eq!(Constraint::le(0, 70).robustness(150.0), -80.0);
    }

    #[test]
    fn widen() {
        let guard = Guard::from([Constraint::gt(0, 1), Constraint::le(0, 4), Constraint::lt(1, 2)]);
        let widened = guard.widen();

        assert_eq!(widened.len(), 2);
        assert!(widened.constraints().all(|c| c.order != Order::Gt));
    }

    #[test]
    fn restrict_zone() {
        let guard = Guard::from([Constraint::gt(0, 1), Constraint::lt(0, 1)]);
        let mut zone = Zone::zero(1);
        zone.elapse();
        guard.restrict(&mut zone);

        assert!(!zone.is_satisfiable());
    }
}
