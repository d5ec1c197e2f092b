use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. {
            None
        } else {
            Some(Percentage(value))
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `value` within `total`. An empty total reads as 0%.
pub fn share(value: f64, total: f64) -> Percentage {
    if total <= 0. {
        return Percentage(0.);
    }
    Percentage::new_opt((value / total * 100.).max(0.))
        .expect("Percentage should always be at least 0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_of_total() {
        assert_eq!(*share(25., 100.), 25.);
        assert_eq!(*share(35., 35.), 100.);
        assert_eq!(*share(1., 0.), 0.);
        assert_eq!(*share(-5., 100.), 0.);
    }
}
