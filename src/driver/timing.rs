//! Wall-clock extraction from OpenCL profiling events.

use ocl::enums::ProfilingInfo;
use ocl::Event;

use super::DriverError;

/// Elapsed device time for a completed event, in milliseconds.
///
/// Blocks on the event (`wait_for`), then reads `CommandStart`/`CommandEnd`
/// profiling counters (nanoseconds since device epoch) and returns their
/// difference in milliseconds. The queue an event was enqueued on must have
/// been created with `QUEUE_PROFILING_ENABLE`, matching
/// [`super::device::open_device`].
pub fn elapsed(event: &Event) -> Result<f64, DriverError> {
    event.wait_for().map_err(DriverError::bad_profile)?;

    let start = match event.profiling_info(ProfilingInfo::Start).map_err(DriverError::bad_profile)? {
        ocl::core::ProfilingInfoResult::Start(t) => t,
        other => return Err(DriverError::BadProfile(format!("unexpected start info: {other:?}"))),
    };
    let end = match event.profiling_info(ProfilingInfo::End).map_err(DriverError::bad_profile)? {
        ocl::core::ProfilingInfoResult::End(t) => t,
        other => return Err(DriverError::BadProfile(format!("unexpected end info: {other:?}"))),
    };

    Ok((end.saturating_sub(start)) as f64 / 1_000_000.0)
}
