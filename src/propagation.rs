//! # Propagation interface
//!
//! Orbit propagation itself is not part of this crate. A propagator is any type
//! implementing [`Propagator`]: it receives the two fixed-column data lines of an
//! element set, an instant and a [`Precision`], and returns an [`Ephemeris`].
//!
//! [`ElementSet::propagate`] renders the data lines and calls the propagator.
//! [`propagate_batch`] evaluates many element sets at many instants and treats
//! propagation failures as non-fatal: the offending pair is logged and skipped.
use hifitime::Epoch;
use nalgebra::Vector3;
use tracing::warn;

use crate::elements::ElementSet;
use crate::formats::tle::marshal_tle;
use crate::gpelements_errors::ElementsError;

/// Numerical precision requested from the propagator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Standard,
    Higher,
}

/// Position and velocity of an object at one instant, in the propagator's frame and units.
#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    pub at: Epoch,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// A black-box orbit propagator working from fixed-column data lines.
pub trait Propagator {
    /// Position and velocity described by `line1`/`line2` at `at`.
    ///
    /// Arguments
    /// -----------------
    /// * `line1`, `line2`: the two 69-column data lines, checksums included.
    /// * `at`: the instant to propagate to.
    /// * `precision`: numerical precision requested by the caller.
    ///
    /// Return
    /// ----------
    /// * The state at `at`, or `ElementsError::Propagation` when the model
    ///   cannot handle the element set (e.g. unstable eccentricity).
    fn propagate(
        &self,
        line1: &str,
        line2: &str,
        at: Epoch,
        precision: Precision,
    ) -> Result<Ephemeris, ElementsError>;
}

impl ElementSet {
    /// Propagate this set to `at` with `propagator`.
    ///
    /// Fails with a `Range` error when the set cannot be written as data lines,
    /// and with whatever the propagator returns otherwise.
    pub fn propagate<P: Propagator + ?Sized>(
        &self,
        propagator: &P,
        at: Epoch,
        precision: Precision,
    ) -> Result<Ephemeris, ElementsError> {
        let (_, line1, line2) = marshal_tle(self)?;
        propagator.propagate(&line1, &line2, at, precision)
    }
}

/// Propagate every element set to every instant.
///
/// Arguments
/// -----------------
/// * `propagator`: the propagation collaborator.
/// * `sets`: element sets to propagate.
/// * `times`: instants at which each set is evaluated.
/// * `precision`: forwarded to the propagator.
/// * `f`: receives each successful `(set, ephemeris)` pair, sets in order, times in order.
///
/// Return
/// ----------
/// * The number of `(set, time)` pairs that were skipped.
///
/// Notes
/// ----------
/// * A set that cannot be written as data lines skips all its instants.
/// * Every skipped pair is reported with `tracing::warn!`.
pub fn propagate_batch<P, F>(
    propagator: &P,
    sets: &[ElementSet],
    times: &[Epoch],
    precision: Precision,
    mut f: F,
) -> usize
where
    P: Propagator + ?Sized,
    F: FnMut(&ElementSet, Ephemeris),
{
    let mut skipped = 0;
    for e in sets {
        let (line1, line2) = match marshal_tle(e) {
            Ok((_, line1, line2)) => (line1, line2),
            Err(err) => {
                warn!(
                    norad_cat_id = %e.norad_cat_id,
                    error = %err,
                    "Skipping element set that cannot be propagated");
                skipped += times.len();
                continue;
            }
        };

        for &at in times {
            match propagator.propagate(&line1, &line2, at, precision) {
                Ok(ephemeris) => f(e, ephemeris),
                Err(err) => {
                    warn!(
                        norad_cat_id = %e.norad_cat_id,
                        %at,
                        error = %err,
                        "Skipping failed propagation");
                    skipped += 1;
                }
            }
        }
    }
    skipped
}
