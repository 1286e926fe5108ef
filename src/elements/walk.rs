//! # Catalog reassignment and random walks
//!
//! Helpers used to derive synthetic element sets from real ones:
//!
//! - [`next_alpha5_num`] hands out Alpha-5 catalog numbers (`A0000`, `A0001`, …)
//!   from a caller-held counter, block by block.
//! - [`ElementSet::reassign`] and [`ElementSet::update_name`] give a set a new
//!   identity and make that visible in its name (`#A0042 ISS (ZARYA)`).
//! - [`ElementSet::walk`] applies small random perturbations to the mean elements.
//!
//! The random source is always passed in by the caller.
//!
//! ```rust
//! use gpelements::ElementSet;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # fn demo(mut e: ElementSet) -> Result<(), gpelements::ElementsError> {
//! let mut rng = StdRng::seed_from_u64(42);
//! let next_state = e.reassign(0)?;
//! let id = e.norad_cat_id.to_string();
//! e.update_name(&id);
//! assert_eq!(next_state, 1);
//! e.walk(&mut rng, 1, 10);
//! e.inc_set_num()?;
//! # Ok(())
//! # }
//! ```
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::catalog_id::CatalogId;
use crate::constants::{Degree, RevPerDay, ALPHA5_BLOCKS, ALPHA5_BLOCK_SIZE, MAX_ELEMENT_SET_NO};
use crate::elements::ElementSet;
use crate::gpelements_errors::ElementsError;

/// A previous `#<id> ` prefix written by [`ElementSet::update_name`].
static ID_IN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\S+ ").expect("valid name prefix pattern"));

/// Next Alpha-5 catalog number.
///
/// Arguments
/// -----------------
/// * `state`: counter of numbers already handed out, starting at 0.
///
/// Return
/// ----------
/// * The id for `state`, a block letter followed by four digits, and the next counter value.
/// * An `OutOfCapacity` error once the 23 blocks of 10000 numbers are used up.
pub fn next_alpha5_num(state: i64) -> Result<(String, i64), ElementsError> {
    let block = state.div_euclid(ALPHA5_BLOCK_SIZE);
    let rem = state.rem_euclid(ALPHA5_BLOCK_SIZE);

    let letter = usize::try_from(block)
        .ok()
        .and_then(|b| ALPHA5_BLOCKS.chars().nth(b))
        .ok_or_else(|| {
            ElementsError::OutOfCapacity(format!(
                "Alpha-5 state {state} is past the last block ({block})"
            ))
        })?;

    Ok((format!("{letter}{rem:04}"), state + 1))
}

/// Uniform in `(-1, 1]`.
fn unit_step(rng: &mut impl Rng) -> f64 {
    1.0 - 2.0 * rng.random::<f64>()
}

/// Moves by less than 0.01 degree either way.
fn step_degrees(rng: &mut impl Rng, d: Degree) -> Degree {
    d + unit_step(rng) / 100.0
}

/// Moves by less than 0.1 percent and stays in `(0, 1)`.
fn step_eccentricity(rng: &mut impl Rng, x: f64) -> f64 {
    let mut y = x * (1.0 + unit_step(rng) / 1000.0);
    if y >= 1.0 {
        y = 1.0 - rng.random::<f64>() / 1000.0;
    }
    if y <= 0.0 {
        y = rng.random::<f64>() / 1000.0;
    }
    y
}

/// Moves by less than 0.01 percent and stays positive.
fn step_mean_motion(rng: &mut impl Rng, x: RevPerDay) -> RevPerDay {
    let y = x * (1.0 + unit_step(rng) / 10000.0);
    if y <= 0.0 {
        1.0 + unit_step(rng) / 10.0
    } else {
        y
    }
}

impl ElementSet {
    /// Give this set the Alpha-5 catalog number for `state` and return the next state.
    ///
    /// On error the set is left unchanged.
    pub fn reassign(&mut self, state: i64) -> Result<i64, ElementsError> {
        let (id, next) = next_alpha5_num(state)?;
        self.norad_cat_id = CatalogId::new(id);
        Ok(next)
    }

    /// Prefix the name with `#<id> `, replacing a prefix written by an earlier call.
    pub fn update_name(&mut self, id: &str) {
        let bare = ID_IN_NAME.replace(&self.name, "");
        self.name = format!("#{id} {bare}");
    }

    /// Increment the element set number.
    ///
    /// Fails with a `Range` error when the number is already at its maximum.
    pub fn inc_set_num(&mut self) -> Result<(), ElementsError> {
        if self.element_set_no + 1 >= MAX_ELEMENT_SET_NO {
            return Err(ElementsError::range(
                "ELEMENT_SET_NO",
                format!("maximum element set number reached: {}", self.element_set_no),
            ));
        }
        self.element_set_no += 1;
        Ok(())
    }

    /// Random walk of the mean elements.
    ///
    /// Takes a uniform number of steps in `[min_steps, max_steps]`; each step
    /// perturbs one of the six mean elements picked at random. The name, object
    /// id, catalog id and element set number are left as they are.
    /// Nothing happens when `max_steps` is 0 or below `min_steps`.
    ///
    /// Arguments
    /// -----------------
    /// * `rng`: random source, e.g. a seeded `StdRng` for reproducible output.
    /// * `min_steps`, `max_steps`: inclusive bounds on the number of steps.
    pub fn walk(&mut self, rng: &mut impl Rng, min_steps: usize, max_steps: usize) {
        if max_steps < min_steps || max_steps == 0 {
            return;
        }

        let steps = rng.random_range(min_steps..=max_steps);
        for _ in 0..steps {
            match rng.random_range(0..6) {
                0 => self.inclination = step_degrees(rng, self.inclination),
                1 => self.ra_of_asc_node = step_degrees(rng, self.ra_of_asc_node),
                2 => self.eccentricity = step_eccentricity(rng, self.eccentricity),
                3 => self.arg_of_pericenter = step_degrees(rng, self.arg_of_pericenter),
                4 => self.mean_anomaly = step_degrees(rng, self.mean_anomaly),
                _ => self.mean_motion = step_mean_motion(rng, self.mean_motion),
            }
        }
    }
}

#[cfg(test)]
mod walk_test {
    use super::*;
    use crate::elements::elements_test::sample;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_next_alpha5_num() {
        assert_eq!(next_alpha5_num(0).unwrap(), ("A0000".to_string(), 1));
        assert_eq!(next_alpha5_num(9999).unwrap(), ("A9999".to_string(), 10000));
        assert_eq!(next_alpha5_num(10000).unwrap().0, "B0000");
        // L is skipped
        assert_eq!(next_alpha5_num(11 * 10000 + 42).unwrap().0, "M0042");
        assert_eq!(next_alpha5_num(23 * 10000 - 1).unwrap().0, "Z9999");
    }

    #[test]
    fn test_next_alpha5_num_capacity() {
        assert!(matches!(
            next_alpha5_num(23 * 10000),
            Err(ElementsError::OutOfCapacity(_))
        ));
        assert!(matches!(
            next_alpha5_num(-1),
            Err(ElementsError::OutOfCapacity(_))
        ));
    }

    #[test]
    fn test_reassign() {
        let mut e = sample();
        let next = e.reassign(10_001).unwrap();
        assert_eq!(next, 10_002);
        assert_eq!(e.norad_cat_id.as_str(), "B0001");

        let before = e.clone();
        assert!(e.reassign(1_000_000).is_err());
        assert_eq!(e, before);
    }

    #[test]
    fn test_update_name() {
        let mut e = sample();
        e.update_name("A0001");
        assert_eq!(e.name, "#A0001 STARLINK-1329");
        e.update_name("A0002");
        assert_eq!(e.name, "#A0002 STARLINK-1329");

        e.name = String::new();
        e.update_name("A0003");
        assert_eq!(e.name, "#A0003 ");
    }

    #[test]
    fn test_inc_set_num() {
        let mut e = sample();
        e.inc_set_num().unwrap();
        assert_eq!(e.element_set_no, 1000);

        e.element_set_no = 9998;
        e.inc_set_num().unwrap();
        assert_eq!(e.element_set_no, 9999);
        assert!(e.inc_set_num().unwrap_err().is_range_error());
        assert_eq!(e.element_set_no, 9999);
    }

    #[test]
    fn test_walk_keeps_identity_and_bounds() {
        let mut rng = StdRng::seed_from_u64(42_u64);
        let original = sample();
        let mut e = original.clone();
        for _ in 0..200 {
            e.walk(&mut rng, 1, 20);
            assert!(e.eccentricity > 0.0 && e.eccentricity < 1.0);
            assert!(e.mean_motion > 0.0);
        }
        assert_ne!(e, original);
        assert_eq!(e.name, original.name);
        assert_eq!(e.object_id, original.object_id);
        assert_eq!(e.norad_cat_id, original.norad_cat_id);
        assert_eq!(e.element_set_no, original.element_set_no);
        assert_eq!(e.epoch, original.epoch);
    }

    #[test]
    fn test_walk_step_sizes() {
        let mut rng = StdRng::seed_from_u64(7_u64);
        let original = sample();
        let mut e = original.clone();
        e.walk(&mut rng, 1, 1);
        let moved = [
            (e.inclination - original.inclination).abs() / 0.01,
            (e.ra_of_asc_node - original.ra_of_asc_node).abs() / 0.01,
            (e.arg_of_pericenter - original.arg_of_pericenter).abs() / 0.01,
            (e.mean_anomaly - original.mean_anomaly).abs() / 0.01,
            (e.eccentricity / original.eccentricity - 1.0).abs() / 0.001,
            (e.mean_motion / original.mean_motion - 1.0).abs() / 0.0001,
        ];
        assert!(moved.iter().all(|m| *m <= 1.0 + 1e-9));
    }

    #[test]
    fn test_walk_noop() {
        let mut rng = StdRng::seed_from_u64(1_u64);
        let mut e = sample();
        e.walk(&mut rng, 5, 2);
        e.walk(&mut rng, 0, 0);
        assert_eq!(e, sample());
    }

    #[test]
    fn test_step_eccentricity_edges() {
        let mut rng = StdRng::seed_from_u64(3_u64);
        for _ in 0..100 {
            let y = step_eccentricity(&mut rng, 0.0);
            assert!((0.0..0.001).contains(&y));
            let y = step_eccentricity(&mut rng, 0.9999999);
            assert!(y < 1.0);
        }
    }
}
