//! End-to-end driver scenarios against a real OpenCL device.
//!
//! These need an actual GPU (or CPU OpenCL ICD) to run against, which CI
//! doesn't have. Each test probes for a device first and returns early when
//! none is available, rather than `#[ignore]`-ing or asserting through a
//! missing dependency.

use clforge::driver::{open_device, DriverConfig, KernelDriver};

fn try_open() -> Option<(ocl::Context, ocl::Queue)> {
    open_device(&DriverConfig::default()).ok()
}

const INC_KERNEL: &str = "
__kernel void inc(__global int* a, const int n) {
    int i = get_global_id(0);
    if (i < n) {
        a[i] += 1;
    }
}
";

const EMPTY_BODY_KERNEL: &str = "
__kernel void noop(__global int* a, const int n) {
}
";

const GID_ONLY_KERNEL: &str = "
__kernel void gid_only(__global int* a, __global const int* b, const int n) {
    int i = get_global_id(0);
    if (i < n) {
        a[i] = i + 1000;
    }
}
";

const SYNTAX_ERROR_KERNEL: &str = "
__kernel void broken(__global int* a this is not valid C {
";

const TWO_KERNEL_SOURCE: &str = "
__kernel void first(__global int* a) { a[get_global_id(0)] += 1; }
__kernel void second(__global int* a) { a[get_global_id(0)] += 2; }
";

#[test]
fn well_behaved_kernel_validates_and_profiles() {
    let Some((context, queue)) = try_open() else {
        eprintln!("skipping: no OpenCL device available");
        return;
    };

    let mut driver = KernelDriver::new(context, queue, INC_KERNEL).expect("compiles");
    driver.validate(16).expect("inc() is output-producing, deterministic, and input-sensitive");

    let summary = driver.profile(16, 10, false).expect("profiling succeeds");
    assert_eq!(summary.wgsize, 16);
    assert_eq!(summary.transfer_bytes, 4 * 16 * 2, "one non-const int buffer of 16 elements");
    assert!(summary.samples >= 10);
}

#[test]
fn empty_body_kernel_fails_no_outputs() {
    let Some((context, queue)) = try_open() else {
        eprintln!("skipping: no OpenCL device available");
        return;
    };

    let mut driver = KernelDriver::new(context, queue, EMPTY_BODY_KERNEL).expect("compiles");
    let err = driver.validate(16).unwrap_err();
    assert_eq!(err.kind_tag(), "E_NO_OUTPUTS");
}

#[test]
fn gid_only_kernel_fails_input_insensitive() {
    let Some((context, queue)) = try_open() else {
        eprintln!("skipping: no OpenCL device available");
        return;
    };

    let mut driver = KernelDriver::new(context, queue, GID_ONLY_KERNEL).expect("compiles");
    let err = driver.validate(16).unwrap_err();
    assert_eq!(err.kind_tag(), "E_INPUT_INSENSITIVE");
}

#[test]
fn syntax_error_fails_construction() {
    let Some((context, queue)) = try_open() else {
        eprintln!("skipping: no OpenCL device available");
        return;
    };

    let err = KernelDriver::new(context, queue, SYNTAX_ERROR_KERNEL).unwrap_err();
    assert_eq!(err.kind_tag(), "E_BAD_CODE");
}

#[test]
fn with_config_honors_quiet_compiler_flag() {
    let Some((context, queue)) = try_open() else {
        eprintln!("skipping: no OpenCL device available");
        return;
    };

    let cfg = DriverConfig {
        quiet_compiler: false,
        ..DriverConfig::default()
    };
    let driver = KernelDriver::with_config(context, queue, INC_KERNEL, &cfg);
    assert!(driver.is_ok(), "compiles with diagnostics left un-suppressed");
}

#[test]
fn two_kernels_in_one_source_is_ugly_code() {
    let Some((context, queue)) = try_open() else {
        eprintln!("skipping: no OpenCL device available");
        return;
    };

    let err = KernelDriver::new(context, queue, TWO_KERNEL_SOURCE).unwrap_err();
    assert_eq!(err.kind_tag(), "E_UGLY_CODE");
}
