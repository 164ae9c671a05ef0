//! Arithmetic expressions and boolean combinations of comparisons between them.
//!
//! These types describe location labels that go beyond a conjunction of [`Constraint`]s. An
//! [`Expression`] can refer to signal variables `x<i>`, memory variables `m<i>` and integer
//! constants, and a [`BooleanConstraint`] combines comparisons of expressions with `&&`, `||` and
//! `!`.
//!
//! ```rust
//! use qtpm_core::expression::{BooleanConstraint, ComplexConstraint, Expression, Relation};
//!
//! // x0 < 100 && x0 * x1 > x0 + x1
//! let label = BooleanConstraint::and(
//!     ComplexConstraint::new(Expression::signal(0), Relation::Lt, Expression::int(100)).into(),
//!     ComplexConstraint::new(
//!         Expression::signal(0) * Expression::signal(1),
//!         Relation::Gt,
//!         Expression::signal(0) + Expression::signal(1),
//!     )
//!     .into(),
//! );
//!
//! assert_eq!(label.to_string(), "x0<100&&x0*x1>x0+x1");
//! assert!(label.is_satisfied(&[3.0, 4.0], &[]));
//! ```
//!
//! [`Constraint`]: crate::constraint::Constraint

use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Sub};

use crate::semiring::Semiring;

/// Integer arithmetic over signal and memory variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Int(i64),
    Signal(usize),
    Memory(usize),
    Plus(Box<Expression>, Box<Expression>),
    Minus(Box<Expression>, Box<Expression>),
    Times(Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn int(value: i64) -> Self {
        Expression::Int(value)
    }

    pub fn signal(var: usize) -> Self {
        Expression::Signal(var)
    }

    pub fn memory(var: usize) -> Self {
        Expression::Memory(var)
    }

    /// Compute the value of the expression.
    ///
    /// # Panics
    ///
    /// Panics if a variable has no value in the corresponding slice.
    pub fn evaluate(&self, signal: &[f64], memory: &[f64]) -> f64 {
        match self {
            Expression::Int(value) => *value as f64,
            Expression::Signal(var) => signal[*var],
            Expression::Memory(var) => memory[*var],
            Expression::Plus(lhs, rhs) => lhs.evaluate(signal, memory) + rhs.evaluate(signal, memory),
            Expression::Minus(lhs, rhs) => lhs.evaluate(signal, memory) - rhs.evaluate(signal, memory),
            Expression::Times(lhs, rhs) => lhs.evaluate(signal, memory) * rhs.evaluate(signal, memory),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Plus(..) | Expression::Minus(..) => 1,
            Expression::Times(..) => 2,
            _ => 3,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, min_precedence: u8) -> std::fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Int(value) => write!(f, "{}", value),
            Expression::Signal(var) => write!(f, "x{}", var),
            Expression::Memory(var) => write!(f, "m{}", var),
            Expression::Plus(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                write!(f, "+")?;
                rhs.fmt_operand(f, 1)
            }
            Expression::Minus(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                write!(f, "-")?;
                rhs.fmt_operand(f, 2)
            }
            Expression::Times(lhs, rhs) => {
                lhs.fmt_operand(f, 2)?;
                write!(f, "*")?;
                rhs.fmt_operand(f, 3)
            }
        }
    }
}

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Self) -> Self::Output {
        Expression::Plus(Box::new(self), Box::new(rhs))
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Self) -> Self::Output {
        Expression::Minus(Box::new(self), Box::new(rhs))
    }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Self) -> Self::Output {
        Expression::Times(Box::new(self), Box::new(rhs))
    }
}

/// Comparison between two expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Eq => "==",
            Relation::Ge => ">=",
            Relation::Gt => ">",
        }
    }

    fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Relation::Lt => lhs < rhs,
            Relation::Le => lhs <= rhs,
            Relation::Eq => lhs == rhs,
            Relation::Ge => lhs >= rhs,
            Relation::Gt => lhs > rhs,
        }
    }
}

/// The comparison `lhs <relation> rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplexConstraint {
    pub lhs: Expression,
    pub relation: Relation,
    pub rhs: Expression,
}

impl ComplexConstraint {
    pub fn new(lhs: Expression, relation: Relation, rhs: Expression) -> Self {
        Self { lhs, relation, rhs }
    }

    pub fn is_satisfied(&self, signal: &[f64], memory: &[f64]) -> bool {
        let lhs = self.lhs.evaluate(signal, memory);
        let rhs = self.rhs.evaluate(signal, memory);

        self.relation.holds(lhs, rhs)
    }

    /// Signed distance to the boundary of the comparison, or of its negation if `negated`.
    fn robustness(&self, signal: &[f64], memory: &[f64], negated: bool) -> f64 {
        let lhs = self.lhs.evaluate(signal, memory);
        let rhs = self.rhs.evaluate(signal, memory);

        let value = match self.relation {
            Relation::Lt | Relation::Le => rhs - lhs,
            Relation::Ge | Relation::Gt => lhs - rhs,
            Relation::Eq if lhs == rhs => f64::INFINITY,
            Relation::Eq => f64::NEG_INFINITY,
        };

        if negated {
            -value
        } else {
            value
        }
    }
}

impl Display for ComplexConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.lhs, self.relation.symbol(), self.rhs)
    }
}

/// Boolean combination of comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BooleanConstraint {
    Atom(ComplexConstraint),
    And(Box<BooleanConstraint>, Box<BooleanConstraint>),
    Or(Box<BooleanConstraint>, Box<BooleanConstraint>),
    Not(Box<BooleanConstraint>),
}

impl From<ComplexConstraint> for BooleanConstraint {
    fn from(constraint: ComplexConstraint) -> Self {
        BooleanConstraint::Atom(constraint)
    }
}

impl BooleanConstraint {
    pub fn and(lhs: BooleanConstraint, rhs: BooleanConstraint) -> Self {
        BooleanConstraint::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: BooleanConstraint, rhs: BooleanConstraint) -> Self {
        BooleanConstraint::Or(Box::new(lhs), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: BooleanConstraint) -> Self {
        BooleanConstraint::Not(Box::new(inner))
    }

    pub fn is_satisfied(&self, signal: &[f64], memory: &[f64]) -> bool {
        match self {
            BooleanConstraint::Atom(atom) => atom.is_satisfied(signal, memory),
            BooleanConstraint::And(lhs, rhs) => lhs.is_satisfied(signal, memory) && rhs.is_satisfied(signal, memory),
            BooleanConstraint::Or(lhs, rhs) => lhs.is_satisfied(signal, memory) || rhs.is_satisfied(signal, memory),
            BooleanConstraint::Not(inner) => !inner.is_satisfied(signal, memory),
        }
    }

    /// Score the constraint in the semiring `W`.
    ///
    /// Negations are pushed down to the comparisons first. Conjunctions are scored with
    /// [`Semiring::times`], disjunctions with [`Semiring::plus`], and a comparison with its signed
    /// distance to the boundary converted with `W::from`.
    pub fn robustness<W>(&self, signal: &[f64], memory: &[f64]) -> W
    where
        W: Semiring + From<f64>,
    {
        self.robustness_with_polarity(signal, memory, false)
    }

    fn robustness_with_polarity<W>(&self, signal: &[f64], memory: &[f64], negated: bool) -> W
    where
        W: Semiring + From<f64>,
    {
        match (self, negated) {
            (BooleanConstraint::Atom(atom), _) => W::from(atom.robustness(signal, memory, negated)),
            (BooleanConstraint::Not(inner), _) => inner.robustness_with_polarity(signal, memory, !negated),
            (BooleanConstraint::And(lhs, rhs), false) | (BooleanConstraint::Or(lhs, rhs), true) => {
                let lhs: W = lhs.robustness_with_polarity(signal, memory, negated);
                lhs.times(&rhs.robustness_with_polarity(signal, memory, negated))
            }
            (BooleanConstraint::Or(lhs, rhs), false) | (BooleanConstraint::And(lhs, rhs), true) => {
                let lhs: W = lhs.robustness_with_polarity(signal, memory, negated);
                lhs.plus(&rhs.robustness_with_polarity(signal, memory, negated))
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BooleanConstraint::Or(..) => 1,
            BooleanConstraint::And(..) => 2,
            _ => 3,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, min_precedence: u8) -> std::fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl Display for BooleanConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BooleanConstraint::Atom(atom) => write!(f, "{}", atom),
            BooleanConstraint::And(lhs, rhs) => {
                lhs.fmt_operand(f, 2)?;
                write!(f, "&&")?;
                rhs.fmt_operand(f, 3)
            }
            BooleanConstraint::Or(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                write!(f, "||")?;
                rhs.fmt_operand(f, 2)
            }
            BooleanConstraint::Not(inner) => write!(f, "!({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BooleanConstraint, ComplexConstraint, Expression, Relation};
    use crate::semiring::{Boolean, MaxMin, MinPlus};

    fn atom(lhs: Expression, relation: Relation, rhs: Expression) -> BooleanConstraint {
        ComplexConstraint::new(lhs, relation, rhs).into()
    }

    #[test]
    fn evaluate_expression() {
        let e = (Expression::signal(0) + Expression::int(2)) * Expression::memory(0);

        assert_eq!(e.evaluate(&[3.0], &[4.0]), 20.0);
        assert_eq!(e.to_string(), "(x0+2)*m0");
    }

    #[test]
    fn display_keeps_grouping() {
        let e = Expression::signal(0) - (Expression::signal(1) - Expression::int(1));
        assert_eq!(e.to_string(), "x0-(x1-1)");

        let e = Expression::signal(0) + Expression::signal(1) * Expression::int(3);
        assert_eq!(e.to_string(), "x0+x1*3");
    }

    #[test]
    fn satisfaction() {
        let phi = BooleanConstraint::or(
            atom(Expression::signal(0), Relation::Gt, Expression::int(10)),
            BooleanConstraint::not(atom(Expression::signal(1), Relation::Eq, Expression::int(0))),
        );

        assert!(phi.is_satisfied(&[11.0, 0.0], &[]));
        assert!(phi.is_satisfied(&[1.0, 1.0], &[]));
        assert!(!phi.is_satisfied(&[1.0, 0.0], &[]));
        assert_eq!(phi.to_string(), "x0>10||!(x1==0)");
    }

    #[test]
    fn robustness() {
        let phi = BooleanConstraint::and(
            atom(Expression::signal(0), Relation::Gt, Expression::int(100)),
            atom(Expression::signal(1), Relation::Lt, Expression::int(30)),
        );

        assert_eq!(phi.robustness::<MinPlus>(&[130.0, 20.0], &[]), MinPlus(40.0));
        assert_eq!(phi.robustness::<MaxMin>(&[130.0, 20.0], &[]), MaxMin(10.0));
        assert_eq!(phi.robustness::<Boolean>(&[130.0, 40.0], &[]), Boolean(false));
    }

    #[test]
    fn robustness_of_negation() {
        // !(x0 > 100 && x1 < 30) is scored as x0 <= 100 || x1 >= 30
        let phi = BooleanConstraint::not(BooleanConstraint::and(
            atom(Expression::signal(0), Relation::Gt, Expression::int(100)),
            atom(Expression::signal(1), Relation::Lt, Expression::int(30)),
        ));

        assert_eq!(phi.robustness::<MaxMin>(&[130.0, 20.0], &[]), MaxMin(-10.0));
        assert_eq!(phi.robustness::<MaxMin>(&[90.0, 20.0], &[]), MaxMin(10.0));
    }
}
