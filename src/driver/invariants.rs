//! Runtime invariant checks for payload and driver state.
//!
//! Debug-only assertions: cheap to leave compiled into debug builds,
//! compiled out of release builds, and a single place to name the shape
//! guarantees the rest of the driver code is allowed to assume.

use super::prototype::KernelArg;
use super::types::HostBuffer;

/// A pointer argument that isn't `__local` must carry host-side storage; a
/// `__local` argument must not:
/// `host.present ⇔ arg.is_pointer ∧ ¬arg.is_local`.
pub fn check_host_presence(arg: &KernelArg, host: Option<&HostBuffer>) {
    let expects_host = arg.is_pointer && !arg.is_local;
    debug_assert_eq!(
        host.is_some(),
        expects_host,
        "arg {:?}: host buffer presence must match is_pointer && !is_local",
        arg.name
    );
}

/// Host/device buffer pairs backing the same argument must agree in length
/// and element type.
pub fn check_buffer_shape(arg: &KernelArg, host: &HostBuffer, device_len: usize) {
    debug_assert_eq!(
        host.element_type(),
        arg.element_type,
        "arg {:?}: host buffer element type must match the parsed argument type",
        arg.name
    );
    debug_assert_eq!(
        host.len(),
        device_len,
        "arg {:?}: host and device buffer lengths must match",
        arg.name
    );
}

/// `transfersize` must equal `Σ nbytes` for const global buffers plus
/// `2·Σ nbytes` for non-const global buffers: a const buffer is written
/// once (host→device); a non-const buffer is written and then read back.
pub fn check_transfersize(buffers: &[(&HostBuffer, bool)], transfersize: usize) {
    let expected: usize = buffers
        .iter()
        .map(|(b, is_const)| if *is_const { b.byte_len() } else { 2 * b.byte_len() })
        .sum();
    debug_assert_eq!(
        transfersize, expected,
        "transfersize must equal Σnbytes(const) + 2·Σnbytes(non-const)"
    );
}
