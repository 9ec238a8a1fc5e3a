//! Four-trial differential validation of a kernel's observable behavior.
//!
//! A kernel is only useful as a fuzzing/profiling subject if it actually
//! reads its inputs and writes its outputs deterministically. This module
//! runs the same kernel across two distinct payloads, each twice, and
//! compares outputs to catch three failure classes: no observable output,
//! nondeterminism, and input-insensitivity.

use super::execute::KernelDriver;
use super::payload::KernelPayload;
use super::DriverError;

/// Maximum attempts to draw a second random payload that differs from the
/// first, before giving up rather than looping forever on a pathological
/// random generator.
const MAX_REROLL_ATTEMPTS: usize = 8;

/// Outcome of a validation pass: either the kernel passed, or the specific
/// way it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Passed,
}

impl KernelDriver {
    /// Run the four-trial differential test: sequential payload A run
    /// twice (A1, A2), random payload B run twice (B1, B2), with B
    /// re-rolled until it differs from A's inputs.
    ///
    /// - A1 must equal A2 and B1 must equal B2 (determinism).
    /// - Both A1 and B1 must differ from their own inputs: *each* run must
    ///   produce observable output, not just one of the two (the kernel
    ///   must produce output on every input it's given).
    /// - A1 must differ from B1 (the kernel's output must depend on its
    ///   input, not just on the launch geometry).
    pub fn validate(&mut self, ndrange: usize) -> Result<ValidationOutcome, DriverError> {
        let context = self.context().clone();
        let queue = self.queue().clone();

        let mut a1 = KernelPayload::sequential(self.prototype(), &context, &queue, ndrange)?;
        let a1_inputs = a1.deep_clone(&context, &queue)?;
        self.run_once(&mut a1)?;

        let mut a2 = a1_inputs.deep_clone(&context, &queue)?;
        self.run_once(&mut a2)?;

        if !a1.host_data_eq(&a2) {
            return Err(DriverError::Nondeterministic);
        }

        let b1_inputs = find_distinct_random_payload(self, &context, &queue, ndrange, &a1_inputs)?;
        let mut b1 = b1_inputs.deep_clone(&context, &queue)?;
        self.run_once(&mut b1)?;

        let mut b2 = b1_inputs.deep_clone(&context, &queue)?;
        self.run_once(&mut b2)?;

        if !b1.host_data_eq(&b2) {
            return Err(DriverError::Nondeterministic);
        }

        if a1.host_data_eq(&a1_inputs) || b1.host_data_eq(&b1_inputs) {
            return Err(DriverError::NoOutputs);
        }

        let has_non_const_arg = self.prototype().args.iter().any(|a| !a.is_const);
        if has_non_const_arg && a1.host_data_eq(&b1) {
            return Err(DriverError::InputInsensitive);
        }

        Ok(ValidationOutcome::Passed)
    }
}

fn find_distinct_random_payload(
    driver: &KernelDriver,
    context: &ocl::Context,
    queue: &ocl::Queue,
    ndrange: usize,
    distinct_from: &KernelPayload,
) -> Result<KernelPayload, DriverError> {
    for _ in 0..MAX_REROLL_ATTEMPTS {
        let candidate = KernelPayload::random(driver.prototype(), context, queue, ndrange)?;
        if !candidate.host_data_eq(distinct_from) {
            return Ok(candidate);
        }
    }
    Err(DriverError::BadDriver(
        "could not synthesize a random payload distinct from the sequential baseline".into(),
    ))
}
