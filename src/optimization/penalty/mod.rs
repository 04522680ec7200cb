//! penalty — keep-away guard for parameters outside a model's domain.
//!
//! Purpose
//! -------
//! Let unconstrained optimizers wander across a model's declared lower
//! bounds without ever evaluating the model out of domain. Out-of-domain
//! points get a finite penalty that grows exponentially with the distance
//! past each violated bound and whose gradient points back into the domain.
//!
//! Key behaviors
//! -------------
//! - [`keep_away`] is the scalar barrier `exp(|value − limit|) · base`.
//! - [`detect`] compares a parameter vector against declared
//!   [`LowerBound`](crate::models::LowerBound)s and builds the rescue point:
//!   each violated coordinate moved to `limit + RESCUE_OFFSET`.
//! - [`Guarded`] pairs a model with one data set and a [`RescueCache`].
//!   Inside the domain it forwards to the model; outside it returns the
//!   penalty folded across all violated axes, with `|cost(rescue)|` as base.
//!
//! Invariants & assumptions
//! ------------------------
//! - The penalty is finite, never NaN, strictly increasing as any violated
//!   coordinate moves away from its limit (while `base > 0`), and never below
//!   the rescue-point magnitude.
//! - Rescue values are memoized per [`Guarded`] instance only. Two
//!   estimations over different data never share a rescue value, so the
//!   penalty at `beta` is a pure function of `(model, data, beta)`.
//! - Non-finite parameters are rejected, not penalized.
//!
//! Conventions
//! -----------
//! - All values are costs (negated log-likelihoods), matching the model
//!   layer.

pub mod guarded;
pub mod keep_away;
pub mod rescue;

pub use self::guarded::Guarded;
pub use self::keep_away::{Boundary, RESCUE_OFFSET, Violation, detect, keep_away};
pub use self::rescue::RescueCache;
