//! Device selection and context acquisition.

use ocl::{Context, Device, DeviceType, Platform, Queue};
use serde::{Deserialize, Serialize};

use super::DriverError;

/// Configuration knobs for a driver run: which device class to target, the
/// default problem size, and whether validation runs are mandatory or
/// best-effort.
///
/// Derives `serde::Deserialize` like any plain config struct, so it can be
/// loaded from a TOML file in addition to being built programmatically;
/// this crate has no mandatory config file, but nothing stops a caller
/// from feeding one in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Preferred device class. `None` means "accept any device the
    /// platform exposes."
    pub device_type: Option<RequestedDeviceType>,
    /// Default problem size (element count) used when a caller doesn't
    /// specify one explicitly.
    pub size: Option<usize>,
    /// Whether constructing a [`super::execute::KernelDriver`] must succeed
    /// at an initial validation pass before it is handed back to the
    /// caller.
    pub must_validate: bool,
    /// Whether a failed validation pass is a hard error (`true`) or merely
    /// logged (`false`).
    pub fatal_errors: bool,
    /// Suppress compiler diagnostic output on successful builds.
    pub quiet_compiler: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device_type: None,
            size: None,
            must_validate: false,
            fatal_errors: false,
            quiet_compiler: true,
        }
    }
}

/// A serde-friendly mirror of `ocl::DeviceType`'s CPU/GPU/accelerator
/// distinction. `ocl::DeviceType` is a bitflags type without a `Deserialize`
/// impl, so configs name a class here and this module maps it across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedDeviceType {
    Cpu,
    Gpu,
    Accelerator,
    Any,
}

impl From<RequestedDeviceType> for DeviceType {
    fn from(r: RequestedDeviceType) -> Self {
        match r {
            RequestedDeviceType::Cpu => DeviceType::CPU,
            RequestedDeviceType::Gpu => DeviceType::GPU,
            RequestedDeviceType::Accelerator => DeviceType::ACCELERATOR,
            RequestedDeviceType::Any => DeviceType::ALL,
        }
    }
}

/// Open a context and profiling-enabled command queue for the first device
/// across all platforms matching `cfg.device_type`.
///
/// Mirrors pyopencl's common "first platform, first matching device"
/// bring-up idiom: this driver runs one kernel at a time and has no use for
/// multi-device orchestration, so it does not expose device enumeration
/// beyond picking one.
pub fn open_device(cfg: &DriverConfig) -> Result<(Context, Queue), DriverError> {
    let wanted: DeviceType = cfg.device_type.unwrap_or(RequestedDeviceType::Any).into();

    let platforms = Platform::list();
    if platforms.is_empty() {
        return Err(DriverError::NotSupported);
    }

    for platform in platforms {
        let devices = Device::list(platform, Some(wanted)).unwrap_or_default();
        if let Some(device) = devices.into_iter().next() {
            tracing::debug!(
                platform = %platform.name().unwrap_or_default(),
                device = %device.name().unwrap_or_default(),
                "selected device"
            );
            let context = Context::builder()
                .platform(platform)
                .devices(device)
                .build()
                .map_err(DriverError::from)?;
            let queue = Queue::new(&context, device, Some(ocl::flags::QUEUE_PROFILING_ENABLE))
                .map_err(DriverError::from)?;
            return Ok((context, queue));
        }
    }

    Err(DriverError::DeviceNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let cfg = DriverConfig::default();
        assert!(cfg.device_type.is_none());
        assert!(!cfg.fatal_errors);
        assert!(!cfg.must_validate);
    }

    #[test]
    fn requested_device_type_maps_to_ocl_flags() {
        assert_eq!(DeviceType::from(RequestedDeviceType::Gpu), DeviceType::GPU);
        assert_eq!(DeviceType::from(RequestedDeviceType::Any), DeviceType::ALL);
    }
}
