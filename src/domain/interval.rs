use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which tail a probability query addresses.
///
/// `Lower` is `P(X <= x)`, `Upper` is `P(X > x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Lower,
    Upper,
}

impl Interval {
    /// The opposite tail.
    pub fn flip(self) -> Self {
        match self {
            Interval::Lower => Interval::Upper,
            Interval::Upper => Interval::Lower,
        }
    }

    /// Rewrite a probability of this tail as a lower-tail probability.
    pub fn to_lower(self, p: f64) -> f64 {
        match self {
            Interval::Lower => p,
            Interval::Upper => 1.0 - p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_is_an_involution() {
        assert_eq!(Interval::Lower.flip(), Interval::Upper);
        assert_eq!(Interval::Upper.flip().flip(), Interval::Upper);
    }
}
