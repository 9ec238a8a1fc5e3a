//! Dynamic analysis, validation, and profiling of a single OpenCL kernel.
//!
//! [`execute::KernelDriver`] compiles one `__kernel` function and runs it
//! against synthesized [`payload::KernelPayload`]s; [`validate`] and
//! [`profile`] build on top of that single-call primitive to check a
//! kernel's behavior and to summarize its running time.

pub mod device;
pub mod execute;
pub mod invariants;
pub mod payload;
pub mod profile;
pub mod prototype;
pub mod timing;
pub mod types;
pub mod validate;

pub use device::{open_device, DriverConfig, RequestedDeviceType};
pub use execute::KernelDriver;
pub use payload::{ArgState, KernelPayload};
pub use profile::ProfileSummary;
pub use prototype::{KernelArg, KernelPrototype, PrototypeError};
pub use types::{DeviceGlobalBuffer, ElementType, HostBuffer, ScalarValue};
pub use validate::ValidationOutcome;

/// Errors raised by the kernel driver, from device acquisition through
/// profiling. Each variant carries a stable `kind_tag` so callers can
/// match on driver failures by a fixed string identifier instead of the
/// enum variant itself.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("no OpenCL platform is available on this host")]
    NotSupported,
    #[error("no device matching the requested type was found")]
    DeviceNotFound,
    #[error("kernel source failed to compile: {0}")]
    BadCode(String),
    #[error("source must expose exactly one kernel, found {0}")]
    UglyCode(usize),
    #[error(transparent)]
    Prototype(#[from] PrototypeError),
    #[error("argument binding failed: {0}")]
    BadArgs(String),
    #[error("profiling data could not be read: {0}")]
    BadProfile(String),
    #[error("kernel produced no observable output")]
    NoOutputs,
    #[error("kernel produced different output across two runs of the same input")]
    Nondeterministic,
    #[error("kernel produced the same output for two different inputs")]
    InputInsensitive,
    #[error("driver could not complete its task: {0}")]
    BadDriver(String),
    /// A kernel run exceeded its time budget. This driver's own execution
    /// path never raises it; it exists for wrapping code that imposes a
    /// wall-clock budget around [`KernelDriver::run_once`].
    #[error("kernel did not terminate within its time budget")]
    NonTerminating,
    #[error(transparent)]
    Ocl(#[from] ocl::Error),
}

impl DriverError {
    pub(crate) fn bad_profile(e: ocl::Error) -> Self {
        Self::BadProfile(e.to_string())
    }

    /// The stable `<ErrorKind>` tag identifying this error variant.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Self::NotSupported => "OpenCLNotSupported",
            Self::DeviceNotFound => "OpenCLDeviceNotFound",
            Self::BadCode(_) => "E_BAD_CODE",
            Self::UglyCode(_) => "E_UGLY_CODE",
            Self::Prototype(_) => "E_BAD_CODE",
            Self::BadArgs(_) => "E_BAD_ARGS",
            Self::BadProfile(_) => "E_BAD_PROFILE",
            Self::NoOutputs => "E_NO_OUTPUTS",
            Self::Nondeterministic => "E_NONDETERMINISTIC",
            Self::InputInsensitive => "E_INPUT_INSENSITIVE",
            Self::BadDriver(_) => "E_BAD_DRIVER",
            Self::NonTerminating => "E_NON_TERMINATING",
            Self::Ocl(_) => "E_BAD_DRIVER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_spec_error_table() {
        assert_eq!(DriverError::NoOutputs.kind_tag(), "E_NO_OUTPUTS");
        assert_eq!(DriverError::Nondeterministic.kind_tag(), "E_NONDETERMINISTIC");
        assert_eq!(DriverError::InputInsensitive.kind_tag(), "E_INPUT_INSENSITIVE");
        assert_eq!(DriverError::UglyCode(2).kind_tag(), "E_UGLY_CODE");
    }
}
