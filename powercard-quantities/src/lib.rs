pub mod power;

use std::ops::Div;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

pub use self::power::Watts;

/// Physical quantity with its dimension encoded in the type.
///
/// Serialized as a bare floating-point number.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Sum,
)]
#[from(i32, f64, OrderedFloat<f64>)]
#[serde(transparent)]
#[must_use]
pub struct Quantity<const POWER: isize, const TIME: isize>(pub OrderedFloat<f64>);

impl<const POWER: isize, const TIME: isize> Quantity<POWER, TIME> {
    pub const ZERO: Self = Self(OrderedFloat(0.0));

    /// Neither infinite nor `NaN`.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.0.0.is_finite()
    }
}

impl<const POWER: isize, const TIME: isize> From<Quantity<POWER, TIME>> for f64 {
    fn from(quantity: Quantity<POWER, TIME>) -> Self {
        quantity.0.0
    }
}

impl<const POWER: isize, const TIME: isize> Div<f64> for Quantity<POWER, TIME> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}
