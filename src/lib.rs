//! The `ndarray-fbe` crate evaluates the forward-backward envelope of
//! composite convex problems over `ndarray` vectors,
//! ```math
//! F(x) = f_1(L_1x + d_1) + f_2(L_2x + d_2) + \langle l, x\rangle + g(x).
//! ```
//!
//! It includes:
//! - a [`Function`](function::Function) trait with optional value,
//!   gradient, conjugate and proximal capabilities, and a few common functions
//! - the [`Conjugate`](function::Conjugate) of any function
//! - [linear operators](linop) with adjoints and composition
//! - a dense Cholesky [solver](linsys) for conjugate evaluations
//! - the [`FBCache`](prox::FBCache), which computes forward steps,
//!   forward-backward steps and the envelope at a point while reusing every
//!   result a new step size leaves valid
//!
//! Solvers built on top (line searches, acceleration, stopping tests) are not
//! part of this crate.
//!
//! Every fallible evaluation returns a [`Result`] with this crate's
//! [`Error`]. Diagnostics go through the `log` facade; no logger is
//! installed here.

#![cfg_attr(all(rustc_nightly, test), feature(test))]
#[cfg(all(rustc_nightly, test))]
extern crate test;

pub mod error;
pub mod function;
pub mod linop;
pub mod linsys;
pub mod prox;

pub use error::{Error, Operation, Result};
