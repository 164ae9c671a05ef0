use std::ops::Index;

use ordered_float::OrderedFloat;

/// Values of the signal variables during one piece of a piecewise-constant signal.
///
/// Values are stored with a total ordering so that histories of valuations can be used as part of
/// a hash key.
///
/// ```rust
/// use qtpm_core::Valuation;
///
/// let v = Valuation::from([130.0, 20.0]);
/// assert_eq!(v[1], 20.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Valuation(Vec<OrderedFloat<f64>>);

impl Valuation {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, var: usize) -> Option<f64> {
        self.0.get(var).map(|v| v.0)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|v| v.0)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values().collect()
    }
}

impl FromIterator<f64> for Valuation {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self(iter.into_iter().map(OrderedFloat).collect())
    }
}

impl From<Vec<f64>> for Valuation {
    fn from(values: Vec<f64>) -> Self {
        Valuation::from_iter(values)
    }
}

impl<const N: usize> From<[f64; N]> for Valuation {
    fn from(values: [f64; N]) -> Self {
        Valuation::from_iter(values)
    }
}

impl From<&[f64]> for Valuation {
    fn from(values: &[f64]) -> Self {
        values.iter().copied().collect()
    }
}

impl Index<usize> for Valuation {
    type Output = f64;

    fn index(&self, var: usize) -> &Self::Output {
        &self.0[var].0
    }
}
