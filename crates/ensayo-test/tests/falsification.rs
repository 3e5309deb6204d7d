//! Popperian Falsification Tests for Ensayo
//!
//! # Reference
//! Popper, K. (1959). *The Logic of Scientific Discovery*. Routledge.
//!
//! > "A theory which is not refutable by any conceivable event is non-scientific."
//!
//! Each test in this module attempts to falsify a specific claim about Ensayo
//! across its crates. A passing test means the claim survived the
//! falsification attempt.

mod falsification_tests;
