//! Cost functions scoring how well sampled signal values satisfy a location label.
//!
//! The score of a single comparison is its signed distance to the boundary: `c - v` for `x < c`
//! and `x <= c`, `v - c` for `x > c` and `x >= c`. The scores of the constraints of a label and of
//! the valuations observed while staying in a location are combined with [`Semiring::times`], so
//! the meaning of the final score depends on the semiring:
//!
//! ```rust
//! use qtpm_core::constraint::{Constraint, Guard};
//! use qtpm_core::robustness::multiple_robustness;
//! use qtpm_core::semiring::{MaxMin, MinPlus};
//! use qtpm_core::Valuation;
//!
//! let label = Guard::from([Constraint::gt(0, 100), Constraint::lt(1, 30)]);
//! let history = [Valuation::from([130.0, 20.0]), Valuation::from([150.0, 10.0])];
//!
//! assert_eq!(multiple_robustness::<MinPlus>(&label, &history), MinPlus(110.0));
//! assert_eq!(multiple_robustness::<MaxMin>(&label, &history), MaxMin(10.0));
//! ```

use crate::constraint::Guard;
use crate::expression::BooleanConstraint;
use crate::semiring::Semiring;
use crate::signal::Valuation;

/// Scores the signal values observed in a location when the location is left.
///
/// Closures taking the label of the location and the observed values implement this trait, so
/// custom scores can be used without defining a new type.
pub trait CostFunction<W> {
    fn cost(&self, label: &Guard, history: &[Valuation]) -> W;
}

impl<W, F> CostFunction<W> for F
where
    F: Fn(&Guard, &[Valuation]) -> W,
{
    fn cost(&self, label: &Guard, history: &[Valuation]) -> W {
        self(label, history)
    }
}

/// Cost function computing [`multiple_robustness`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceRobustness;

impl<W> CostFunction<W> for SpaceRobustness
where
    W: Semiring + From<f64>,
{
    fn cost(&self, label: &Guard, history: &[Valuation]) -> W {
        multiple_robustness(label, history)
    }
}

/// Score a single valuation against a label.
///
/// # Panics
///
/// Panics if the valuation has no value for a variable used by the label.
pub fn single_robustness<W>(label: &Guard, valuation: &Valuation) -> W
where
    W: Semiring + From<f64>,
{
    label
        .constraints()
        .fold(W::one(), |acc, c| acc.times(&W::from(c.robustness(valuation[c.var]))))
}

/// Score every valuation of `history` against a label.
///
/// An empty history scores [`Semiring::one`].
pub fn multiple_robustness<W>(label: &Guard, history: &[Valuation]) -> W
where
    W: Semiring + From<f64>,
{
    history
        .iter()
        .fold(W::one(), |acc, valuation| acc.times(&single_robustness(label, valuation)))
}

/// Score every valuation of `history` against a boolean label that may refer to memory.
pub fn boolean_robustness<W>(label: &BooleanConstraint, memory: &[f64], history: &[Valuation]) -> W
where
    W: Semiring + From<f64>,
{
    history.iter().fold(W::one(), |acc, valuation| {
        acc.times(&label.robustness(&valuation.to_vec(), memory))
    })
}

#[cfg(test)]
mod tests {
    use super::{boolean_robustness, multiple_robustness, single_robustness, CostFunction, SpaceRobustness};
    use crate::constraint::{Constraint, Guard};
    use crate::expression::{BooleanConstraint, ComplexConstraint, Expression, Relation};
    use crate::semiring::{Boolean, MaxMin, MinPlus, Semiring};
    use crate::signal::Valuation;

    fn label() -> Guard {
        Guard::from([Constraint::gt(0, 100), Constraint::lt(1, 30)])
    }

    #[test]
    fn single() {
        let valuation = Valuation::from([130.0, 20.0]);

        assert_eq!(single_robustness::<MinPlus>(&label(), &valuation), MinPlus(40.0));
        assert_eq!(single_robustness::<MaxMin>(&label(), &valuation), MaxMin(10.0));
        assert_eq!(single_robustness::<Boolean>(&label(), &valuation), Boolean(true));
    }

    #[test]
    fn multiple() {
        let history = [Valuation::from([130.0, 20.0]), Valuation::from([150.0, 10.0])];

        assert_eq!(multiple_robustness::<MinPlus>(&label(), &history), MinPlus(110.0));
        assert_eq!(multiple_robustness::<MaxMin>(&label(), &history), MaxMin(10.0));
    }

    #[test]
    fn empty_label_and_history() {
        let valuation = Valuation::from([1.0]);

        assert_eq!(single_robustness::<MaxMin>(&Guard::new(), &valuation), MaxMin::one());
        assert_eq!(multiple_robustness::<MinPlus>(&label(), &[]), MinPlus::one());
    }

    #[test]
    fn boolean_label() {
        let phi = BooleanConstraint::from(ComplexConstraint::new(
            Expression::signal(0) - Expression::memory(0),
            Relation::Lt,
            Expression::int(10),
        ));
        let history = [Valuation::from([12.0]), Valuation::from([15.0])];

        assert_eq!(boolean_robustness::<MaxMin>(&phi, &[4.0], &history), MaxMin(-1.0));
        assert_eq!(boolean_robustness::<MinPlus>(&phi, &[4.0], &history), MinPlus(1.0));
    }

    #[test]
    fn cost_functions() {
        let history = [Valuation::from([130.0, 20.0])];
        let constant = |_: &Guard, _: &[Valuation]| MaxMin(1.0);

        assert_eq!(CostFunction::<MaxMin>::cost(&SpaceRobustness, &label(), &history), MaxMin(10.0));
        assert_eq!(constant.cost(&label(), &history), MaxMin(1.0));
    }
}
