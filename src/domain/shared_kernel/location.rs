use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use super::random::RandomSource;

// ============================================================================
// Location - integer grid coordinate
// ============================================================================

pub const MIN_COORDINATE: i32 = 1;
pub const MAX_COORDINATE: i32 = 10;

/// Immutable point on the delivery grid, both axes in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    x: i32,
    y: i32,
}

impl Location {
    pub fn create(x: i32, y: i32) -> Result<Self, DomainError> {
        if !(MIN_COORDINATE..=MAX_COORDINATE).contains(&x) {
            return Err(DomainError::InvalidValue("x"));
        }
        if !(MIN_COORDINATE..=MAX_COORDINATE).contains(&y) {
            return Err(DomainError::InvalidValue("y"));
        }

        Ok(Self { x, y })
    }

    /// Uniformly random in-bounds location
    pub fn create_random(random: &dyn RandomSource) -> Self {
        Self {
            x: random.next_in_range(MIN_COORDINATE, MAX_COORDINATE),
            y: random.next_in_range(MIN_COORDINATE, MAX_COORDINATE),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Manhattan distance
    pub fn distance_to(&self, other: &Location) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared_kernel::random::testing::SequenceRandom;
    use proptest::prelude::*;

    #[test]
    fn test_create_valid_location() {
        let location = Location::create(3, 7).unwrap();
        assert_eq!(location.x(), 3);
        assert_eq!(location.y(), 7);
    }

    #[test]
    fn test_create_out_of_range_fails() {
        assert_eq!(Location::create(0, 5), Err(DomainError::InvalidValue("x")));
        assert_eq!(Location::create(11, 5), Err(DomainError::InvalidValue("x")));
        assert_eq!(Location::create(5, 0), Err(DomainError::InvalidValue("y")));
        assert_eq!(Location::create(5, 11), Err(DomainError::InvalidValue("y")));
    }

    #[test]
    fn test_equality_by_value() {
        assert_eq!(Location::create(2, 2).unwrap(), Location::create(2, 2).unwrap());
        assert_ne!(Location::create(2, 2).unwrap(), Location::create(2, 3).unwrap());
    }

    #[test]
    fn test_distance() {
        let a = Location::create(2, 6).unwrap();
        let b = Location::create(4, 9).unwrap();
        assert_eq!(a.distance_to(&b), 5);
        assert_eq!(a.distance_to(&a), 0);
    }

    #[test]
    fn test_create_random_uses_injected_source() {
        let random = SequenceRandom::new(vec![4, 9]);
        let location = Location::create_random(&random);
        assert_eq!(location, Location::create(4, 9).unwrap());
    }

    #[test]
    fn test_create_random_stays_in_bounds() {
        for _ in 0..200 {
            let location = Location::create_random(&crate::domain::shared_kernel::ThreadRandom);
            assert!(Location::create(location.x(), location.y()).is_ok());
        }
    }

    fn coordinate() -> impl Strategy<Value = i32> {
        MIN_COORDINATE..=MAX_COORDINATE
    }

    proptest! {
        #[test]
        fn prop_in_range_round_trips(x in coordinate(), y in coordinate()) {
            let location = Location::create(x, y).unwrap();
            prop_assert_eq!((location.x(), location.y()), (x, y));
        }

        #[test]
        fn prop_out_of_range_is_invalid(x in -50i32..=60, y in coordinate()) {
            prop_assume!(!(MIN_COORDINATE..=MAX_COORDINATE).contains(&x));
            prop_assert_eq!(Location::create(x, y), Err(DomainError::InvalidValue("x")));
        }

        #[test]
        fn prop_distance_is_a_metric(
            a in (coordinate(), coordinate()),
            b in (coordinate(), coordinate()),
            c in (coordinate(), coordinate()),
        ) {
            let a = Location::create(a.0, a.1).unwrap();
            let b = Location::create(b.0, b.1).unwrap();
            let c = Location::create(c.0, c.1).unwrap();

            prop_assert_eq!(a.distance_to(&b), b.distance_to(&a));
            prop_assert_eq!(a.distance_to(&a), 0);
            prop_assert!(a.distance_to(&c) <= a.distance_to(&b) + b.distance_to(&c));
        }
    }
}
