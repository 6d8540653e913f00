use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
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

/// Share of `value` in `whole`, both in seconds. `None` when `whole` is not positive.
pub fn seconds_percentage(value: f64, whole: f64) -> Option<Percentage> {
    if whole <= 0. {
        return None;
    }
    Percentage::new_opt(value / whole * 100.)
}

#[cfg(test)]
mod tests {
    use super::seconds_percentage;

    #[test]
    fn test_percentage_formatting() {
        let p = seconds_percentage(1., 3.).unwrap();
        assert_eq!(p.to_string(), "33.3%");
    }

    #[test]
    fn test_percentage_of_nothing() {
        assert!(seconds_percentage(0., 0.).is_none());
    }
}
