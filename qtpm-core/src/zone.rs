//! Convex sets of clock valuations represented as difference bound matrices.
//!
//! A [`Zone`] over `N` clocks is an `(N+1)×(N+1)` matrix of [`Bound`]s. Row and column `0` belong
//! to the reference clock, whose value is always zero, and row/column `x + 1` belongs to the user
//! clock `x`. The cell `(i, j)` constrains the difference `clock_i - clock_j`. Clocks are named
//! with the [`Clock`] type so that the offset between the clock number and the matrix index never
//! has to be written by hand.
//!
//! Most operations keep the matrix in canonical form, where every cell holds the tightest bound
//! implied by the others. The ones that do not say so in their documentation, and the zone must be
//! closed again with [`Zone::canonize`] (or [`Zone::close1`] on the touched clocks) before its
//! satisfiability or inclusion is queried.
//!
//! ```rust
//! use qtpm_core::{Bound, Clock, Zone};
//!
//! let mut zone = Zone::zero(2);
//! zone.elapse();
//! zone.tighten(Clock::Var(0), Clock::Zero, Bound::closed(5.0));   // x0 ≤ 5
//! zone.tighten(Clock::Zero, Clock::Var(1), Bound::closed(-3.0));  // x1 ≥ 3
//!
//! assert!(zone.is_satisfiable());
//! ```

use std::ops::{BitAndAssign, Index};

use crate::bound::Bound;

/// A clock of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clock {
    /// The reference clock that is always zero.
    Zero,
    /// A user clock.
    Var(usize),
}

impl Clock {
    /// Row and column of the clock in the matrix.
    pub fn index(self) -> usize {
        match self {
            Clock::Zero => 0,
            Clock::Var(x) => x + 1,
        }
    }
}

/// Hashable representation of a zone used to identify equal zones.
///
/// The key omits the cell `(0, 0)`, which can hold different values for zones that are equal
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneKey {
    cells: Vec<Bound>,
    max_constant: Bound,
}

/// Difference bound matrix.
#[derive(Debug, Clone)]
pub struct Zone {
    dim: usize,
    cells: Vec<Bound>,
    max_constant: Bound,
}

impl Zone {
    /// Create a zone over `num_vars` clocks in which every clock is exactly zero.
    pub fn zero(num_vars: usize) -> Self {
        let dim = num_vars + 1;

        Self {
            dim,
            cells: vec![Bound::ZERO; dim * dim],
            max_constant: Bound::INFINITY,
        }
    }

    /// Number of user clocks of the zone.
    pub fn num_vars(&self) -> usize {
        self.dim - 1
    }

    /// Constant used by [`Zone::abstractize`].
    pub fn max_constant(&self) -> Bound {
        self.max_constant
    }

    pub fn set_max_constant(&mut self, max_constant: Bound) {
        self.max_constant = max_constant;
    }

    /// Bound of the difference between the clocks in row `i` and column `j` of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> Bound {
        self.cells[self.offset(i, j)]
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.dim && j < self.dim, "cell ({i}, {j}) outside of a {0}x{0} zone", self.dim);
        i * self.dim + j
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, bound: Bound) {
        let offset = self.offset(i, j);
        self.cells[offset] = bound;
    }

    #[inline]
    fn restrict(&mut self, i: usize, j: usize, bound: Bound) {
        let offset = self.offset(i, j);
        self.cells[offset] = self.cells[offset].min(bound);
    }

    /// Project the zone onto the clocks `from..=to`.
    ///
    /// The reference clock is kept, and the cell `(0, 0)` of the result is reset to `(0, ≤)`.
    pub fn cut_vars(&self, from: usize, to: usize) -> Zone {
        debug_assert!(from <= to && to < self.num_vars());

        let mut out = Zone::zero(to - from + 1);
        out.max_constant = self.max_constant;

        let source = |k: usize| if k == 0 { 0 } else { from + k };

        for i in 0..out.dim {
            for j in 0..out.dim {
                if i == 0 && j == 0 {
                    continue;
                }

                out.set(i, j, self.get(source(i), source(j)));
            }
        }

        out
    }

    /// Add the constraint `x - y ≤ bound` without restoring the canonical form.
    pub fn tighten_without_close(&mut self, x: Clock, y: Clock, bound: Bound) {
        self.restrict(x.index(), y.index(), bound);
    }

    /// Add the constraint `x - y ≤ bound` and close the zone through both clocks.
    pub fn tighten(&mut self, x: Clock, y: Clock, bound: Bound) {
        self.tighten_without_close(x, y, bound);
        self.close1(x);
        self.close1(y);
    }

    /// Relax every cell through the clock `k`.
    ///
    /// This is one pivot of the Floyd-Warshall algorithm and restores the canonical form of a
    /// canonical zone in which only cells of row or column `k` were tightened.
    pub fn close1(&mut self, k: Clock) {
        self.close_through(k.index());
    }

    fn close_through(&mut self, k: usize) {
        for i in 0..self.dim {
            let through = self.get(i, k);

            if through.is_infinite() {
                continue;
            }

            for j in 0..self.dim {
                let candidate = through + self.get(k, j);
                self.restrict(i, j, candidate);
            }
        }
    }

    /// Compute the tightest form of every cell.
    pub fn canonize(&mut self) {
        for k in 0..self.dim {
            self.close_through(k);
        }
    }

    /// Check that no difference is bounded below its own negation.
    ///
    /// The result is only reliable for canonical zones.
    pub fn is_satisfiable_without_canonize(&self) -> bool {
        (0..self.dim).all(|i| (0..self.dim).all(|j| self.get(i, j) + self.get(j, i) >= Bound::ZERO))
    }

    /// Canonize the zone and check that it contains at least one valuation.
    pub fn is_satisfiable(&mut self) -> bool {
        self.canonize();
        self.is_satisfiable_without_canonize()
    }

    pub fn is_canonical(&self) -> bool {
        let mut closed = self.clone();
        closed.canonize();

        !closed.is_satisfiable_without_canonize() || closed.cells == self.cells
    }

    /// Set the clock `x` to zero.
    pub fn reset(&mut self, x: usize) {
        let x = Clock::Var(x).index();

        self.set(0, x, Bound::ZERO);
        self.set(x, 0, Bound::ZERO);

        for i in 1..self.dim {
            let bound = self.get(i, 0);
            self.set(i, x, bound);
        }

        for j in 1..self.dim {
            let bound = self.get(0, j);
            self.set(x, j, bound);
        }

        self.close_through(x);
    }

    /// Remove every constraint on the clock `x` except `x ≥ 0`.
    ///
    /// The result is not canonical.
    pub fn release(&mut self, x: usize) {
        let x = Clock::Var(x).index();

        for k in 0..self.dim {
            self.set(k, x, Bound::INFINITY);
            self.set(x, k, Bound::INFINITY);
        }

        self.set(x, x, Bound::ZERO);
        self.set(0, x, Bound::ZERO);
    }

    /// Let a strictly positive amount of time pass.
    ///
    /// All upper bounds of the clocks are removed and the lower bounds become strict.
    pub fn elapse(&mut self) {
        for i in 0..self.dim {
            self.set(i, 0, Bound::INFINITY);
        }

        for j in 0..self.dim {
            let offset = self.offset(0, j);
            self.cells[offset].closed = false;
        }
    }

    /// Drop every bound that is not tighter than the maximum constant.
    pub fn abstractize(&mut self) {
        let max_constant = self.max_constant;

        for cell in self.cells.iter_mut() {
            if *cell >= max_constant {
                *cell = Bound::INFINITY;
            }
        }
    }

    /// Turn the zone into an empty zone.
    pub fn make_unsat(&mut self) {
        self.set(0, 0, Bound::new(f64::NEG_INFINITY, false));
    }

    /// Key that identifies the zone.
    pub fn to_key(&self) -> ZoneKey {
        ZoneKey {
            cells: self.cells[1..].to_vec(),
            max_constant: self.max_constant,
        }
    }

    /// Check that every cell is strictly greater than the corresponding cell of `other`.
    pub fn strictly_greater(&self, other: &Zone) -> bool {
        debug_assert_eq!(self.dim, other.dim);
        self.cells.iter().zip(&other.cells).all(|(a, b)| a > b)
    }

    /// Check that this zone is a subset of `other`.
    ///
    /// The zone is assumed to be canonical. An unsatisfiable zone is a subset of every zone.
    pub fn is_subset_of(&self, other: &Zone) -> bool {
        debug_assert_eq!(self.dim, other.dim);
        !self.is_satisfiable_without_canonize() || self.cells.iter().zip(&other.cells).all(|(a, b)| a <= b)
    }

    /// Smallest zone containing both zones.
    pub fn convex_union(&self, other: &Zone) -> Zone {
        debug_assert_eq!(self.dim, other.dim);

        let cells = self.cells.iter().zip(&other.cells).map(|(a, b)| *a.max(b)).collect();

        Zone {
            dim: self.dim,
            cells,
            max_constant: self.max_constant,
        }
    }

    /// Replace this zone with the union of both zones if the union is convex.
    ///
    /// Returns `false` and leaves the zone untouched if the union cannot be represented by a
    /// single zone.
    pub fn merge(&mut self, other: &Zone) -> bool {
        if self.is_subset_of(other) {
            self.cells.clone_from(&other.cells);
            return true;
        }

        if other.is_subset_of(self) {
            return true;
        }

        let hull = self.convex_union(other);

        // The hull is exactly the union if every part of it outside this zone lies in `other`.
        // Each part outside this zone violates one of its constraints, which is obtained by
        // tightening a single cell of the hull to the complement of that constraint.
        for i in 0..self.dim {
            for j in 0..self.dim {
                if i == j {
                    continue;
                }

                let complement = -self.get(j, i);

                if complement.value == f64::NEG_INFINITY || hull.get(i, j) <= complement {
                    continue;
                }

                let mut outside = hull.clone();
                outside.set(i, j, complement);
                outside.close_through(i);
                outside.close_through(j);

                if !outside.is_subset_of(other) {
                    return false;
                }
            }
        }

        self.cells = hull.cells;
        true
    }
}

impl Index<(usize, usize)> for Zone {
    type Output = Bound;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.cells[self.offset(i, j)]
    }
}

/// Equality of the constraints, ignoring the cell `(0, 0)` and the maximum constant.
impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.dim == other.dim && self.cells[1..] == other.cells[1..]
    }
}

/// Intersection of two zones.
impl BitAndAssign<&Zone> for Zone {
    fn bitand_assign(&mut self, rhs: &Zone) {
        debug_assert_eq!(self.dim, rhs.dim);

        for (cell, bound) in self.cells.iter_mut().zip(&rhs.cells) {
            *cell = (*cell).min(*bound);
        }

        self.canonize();
    }
}
