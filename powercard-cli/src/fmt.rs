use std::fmt::{Debug, Display, Formatter};

use powercard_history::Watts;

/// Power reading, or `---` when there is no data.
pub struct FormattedPower(pub Option<Watts>);

impl Debug for FormattedPower {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for FormattedPower {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(watts) => Display::fmt(&watts, f),
            None => f.write_str("---"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FormattedPower(Some(Watts::from(399.6))).to_string(), "400 W");
        assert_eq!(FormattedPower(None).to_string(), "---");
    }
}
