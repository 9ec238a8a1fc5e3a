//! Synthesized kernel arguments: host buffers, device buffers, and scalars
//! bundled together as one runnable call.

use ocl::{Buffer, Context, MemFlags, Queue};

use super::invariants;
use super::prototype::KernelPrototype;
use super::types::{DeviceGlobalBuffer, ElementType, HostBuffer, PayloadGenerator, ScalarValue};
use super::DriverError;

/// Storage backing a single kernel argument at call time.
pub enum ArgState {
    /// A `__global` pointer argument: host storage plus its device mirror.
    Global {
        host: HostBuffer,
        device: DeviceGlobalBuffer,
        is_const: bool,
    },
    /// A `__local` pointer argument: no host storage, only a device-side
    /// allocation sized in elements.
    Local { element_type: ElementType, len: usize },
    /// A non-pointer argument passed by value.
    Scalar(ScalarValue),
}

impl ArgState {
    pub fn host_buffer(&self) -> Option<&HostBuffer> {
        match self {
            Self::Global { host, .. } => Some(host),
            _ => None,
        }
    }
}

/// Element-wise equality for two argument states bound to the same
/// prototype position.
///
/// Scalars compare by device-side value; global buffers
/// compare by host-buffer length and contents; local scratch allocations
/// are never compared (their contents are kernel-private working memory,
/// not part of a payload's observable input/output).
fn args_eq(a: &ArgState, b: &ArgState) -> bool {
    match (a, b) {
        (ArgState::Global { host: ha, .. }, ArgState::Global { host: hb, .. }) => ha == hb,
        (ArgState::Scalar(va), ArgState::Scalar(vb)) => va == vb,
        (ArgState::Local { .. }, ArgState::Local { .. }) => true,
        _ => false,
    }
}

/// One complete, ready-to-run argument binding for a kernel: every global
/// buffer synthesized on both host and device, every local buffer sized,
/// every scalar assigned a value.
///
/// Bundles the running totals a transfer-cost accounting needs:
/// `transfersize` (bytes moved host<->device so far) and the accumulated
/// host<->device transfer time.
pub struct KernelPayload {
    pub args: Vec<ArgState>,
    /// Global work size (1-D `NDRange`); this driver only targets
    /// single-dimension kernels.
    pub ndrange: usize,
    /// Total bytes transferred across every completed `host_to_device` and
    /// `device_to_host` call.
    pub transfersize: usize,
    h2d_ms: f64,
    d2h_ms: f64,
}

impl KernelPayload {
    /// Synthesize a payload whose global buffers hold `0, 1, 2, ...` per
    /// element -- deterministic, useful as one half of the validator's
    /// differential pairs.
    pub fn sequential(
        prototype: &KernelPrototype,
        context: &Context,
        queue: &Queue,
        ndrange: usize,
    ) -> Result<Self, DriverError> {
        Self::build(prototype, context, queue, ndrange, |ty, n| ty.sequential(n))
    }

    /// Synthesize a payload whose global buffers hold independently random
    /// values.
    pub fn random(
        prototype: &KernelPrototype,
        context: &Context,
        queue: &Queue,
        ndrange: usize,
    ) -> Result<Self, DriverError> {
        Self::build(prototype, context, queue, ndrange, |ty, n| ty.random(n))
    }

    fn build(
        prototype: &KernelPrototype,
        context: &Context,
        queue: &Queue,
        ndrange: usize,
        gen_host: impl Fn(ElementType, usize) -> HostBuffer,
    ) -> Result<Self, DriverError> {
        let mut args = Vec::with_capacity(prototype.args.len());

        for arg in &prototype.args {
            let veclength = ndrange * arg.vector_width as usize;
            let state = if arg.is_pointer && arg.is_local {
                ArgState::Local {
                    element_type: arg.element_type,
                    len: veclength,
                }
            } else if arg.is_pointer {
                let host = gen_host(arg.element_type, veclength);
                let device = device_buffer_for(context, queue, &host)?;
                invariants::check_host_presence(arg, Some(&host));
                invariants::check_buffer_shape(arg, &host, device.len());
                ArgState::Global {
                    host,
                    device,
                    is_const: arg.is_const,
                }
            } else {
                invariants::check_host_presence(arg, None);
                ArgState::Scalar(ScalarValue::from_size(arg.element_type, ndrange))
            };
            args.push(state);
        }

        Ok(Self {
            args,
            ndrange,
            transfersize: 0,
            h2d_ms: 0.0,
            d2h_ms: 0.0,
        })
    }

    /// Deep clone: new device-side buffers are allocated and loaded with
    /// the same data, rather than sharing the originals. Used by the
    /// validator to run the same input through a kernel twice without one
    /// run's in-place writes contaminating the other.
    pub fn deep_clone(&self, context: &Context, queue: &Queue) -> Result<Self, DriverError> {
        let mut args = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let cloned = match arg {
                ArgState::Global { host, is_const, .. } => ArgState::Global {
                    device: device_buffer_for(context, queue, host)?,
                    host: host.clone(),
                    is_const: *is_const,
                },
                ArgState::Local { element_type, len } => ArgState::Local {
                    element_type: *element_type,
                    len: *len,
                },
                ArgState::Scalar(v) => ArgState::Scalar(*v),
            };
            args.push(cloned);
        }
        Ok(Self {
            args,
            ndrange: self.ndrange,
            transfersize: 0,
            h2d_ms: 0.0,
            d2h_ms: 0.0,
        })
    }

    /// Payload equality: same argument count, and per-arg
    /// either equal scalar device value or equal host-buffer contents.
    /// Local scratch buffers are never compared.
    pub fn host_data_eq(&self, other: &Self) -> bool {
        self.args.len() == other.args.len()
            && self.args.iter().zip(&other.args).all(|(a, b)| args_eq(a, b))
    }

    /// Upload every global buffer's current host data to its device
    /// mirror, accumulating elapsed transfer time and the byte total.
    ///
    /// Every global argument is written here, const or not -- both need
    /// their initial values placed on the device. `transfersize`'s const
    /// contribution is exactly this write; its non-const contribution adds
    /// a second `nbytes` in [`Self::device_to_host`] for the read-back.
    pub fn host_to_device(&mut self, queue: &Queue) -> Result<(), DriverError> {
        let mut bytes = 0usize;
        for arg in &mut self.args {
            if let ArgState::Global { host, device, .. } = arg {
                let ms = write_device_buffer(queue, host, device)?;
                self.h2d_ms += ms;
                bytes += host.byte_len();
            }
        }
        self.transfersize += bytes;
        Ok(())
    }

    /// Download every non-const global buffer's device data back into host
    /// storage. Const pointers are never read back -- the kernel contract
    /// treats them as inputs only.
    ///
    /// Returns the *upload* accumulator (`h2d_ms`), not the download one.
    /// The accessor named for the download leg deliberately reports the
    /// upload leg's running total; this preserves a known quirk of the
    /// field rather than silently changing its meaning underneath callers
    /// that already depend on it.
    pub fn device_to_host(&mut self, queue: &Queue) -> Result<f64, DriverError> {
        let mut bytes = 0usize;
        for arg in &mut self.args {
            if let ArgState::Global {
                host,
                device,
                is_const: false,
            } = arg
            {
                let ms = read_device_buffer(queue, device, host)?;
                self.d2h_ms += ms;
                bytes += host.byte_len();
            }
        }
        self.transfersize += bytes;
        Ok(self.h2d_ms)
    }

    pub fn h2d_millis(&self) -> f64 {
        self.h2d_ms
    }

    pub fn d2h_millis(&self) -> f64 {
        self.d2h_ms
    }
}

fn device_buffer_for(
    context: &Context,
    queue: &Queue,
    host: &HostBuffer,
) -> Result<DeviceGlobalBuffer, DriverError> {
    fn make<T: ocl::OclPrm>(context: &Context, queue: &Queue, len: usize) -> Result<Buffer<T>, ocl::Error> {
        Buffer::builder()
            .context(context)
            .queue(queue.clone())
            .flags(MemFlags::new().read_write())
            .len(len)
            .build()
    }

    let len = host.len();
    Ok(match host {
        HostBuffer::I8(_) => DeviceGlobalBuffer::I8(make(context, queue, len)?),
        HostBuffer::U8(_) => DeviceGlobalBuffer::U8(make(context, queue, len)?),
        HostBuffer::I16(_) => DeviceGlobalBuffer::I16(make(context, queue, len)?),
        HostBuffer::U16(_) => DeviceGlobalBuffer::U16(make(context, queue, len)?),
        HostBuffer::I32(_) => DeviceGlobalBuffer::I32(make(context, queue, len)?),
        HostBuffer::U32(_) => DeviceGlobalBuffer::U32(make(context, queue, len)?),
        HostBuffer::I64(_) => DeviceGlobalBuffer::I64(make(context, queue, len)?),
        HostBuffer::U64(_) => DeviceGlobalBuffer::U64(make(context, queue, len)?),
        HostBuffer::F32(_) => DeviceGlobalBuffer::F32(make(context, queue, len)?),
        HostBuffer::F64(_) => DeviceGlobalBuffer::F64(make(context, queue, len)?),
    })
}

fn write_device_buffer(
    queue: &Queue,
    host: &HostBuffer,
    device: &mut DeviceGlobalBuffer,
) -> Result<f64, DriverError> {
    fn do_write<T: ocl::OclPrm>(
        buffer: &mut Buffer<T>,
        data: &[T],
        queue: &Queue,
    ) -> Result<f64, DriverError> {
        let mut event = ocl::Event::empty();
        buffer
            .cmd()
            .queue(queue)
            .write(data)
            .enew(&mut event)
            .enq()
            .map_err(DriverError::from)?;
        super::timing::elapsed(&event)
    }
    match (host, device) {
        (HostBuffer::I8(h), DeviceGlobalBuffer::I8(d)) => do_write(d, h, queue),
        (HostBuffer::U8(h), DeviceGlobalBuffer::U8(d)) => do_write(d, h, queue),
        (HostBuffer::I16(h), DeviceGlobalBuffer::I16(d)) => do_write(d, h, queue),
        (HostBuffer::U16(h), DeviceGlobalBuffer::U16(d)) => do_write(d, h, queue),
        (HostBuffer::I32(h), DeviceGlobalBuffer::I32(d)) => do_write(d, h, queue),
        (HostBuffer::U32(h), DeviceGlobalBuffer::U32(d)) => do_write(d, h, queue),
        (HostBuffer::I64(h), DeviceGlobalBuffer::I64(d)) => do_write(d, h, queue),
        (HostBuffer::U64(h), DeviceGlobalBuffer::U64(d)) => do_write(d, h, queue),
        (HostBuffer::F32(h), DeviceGlobalBuffer::F32(d)) => do_write(d, h, queue),
        (HostBuffer::F64(h), DeviceGlobalBuffer::F64(d)) => do_write(d, h, queue),
        _ => unreachable!("host/device element type mismatch"),
    }
}

fn read_device_buffer(
    queue: &Queue,
    device: &DeviceGlobalBuffer,
    host: &mut HostBuffer,
) -> Result<f64, DriverError> {
    fn do_read<T: ocl::OclPrm>(
        buffer: &Buffer<T>,
        data: &mut [T],
        queue: &Queue,
    ) -> Result<f64, DriverError> {
        let mut event = ocl::Event::empty();
        buffer
            .cmd()
            .queue(queue)
            .read(data)
            .enew(&mut event)
            .enq()
            .map_err(DriverError::from)?;
        super::timing::elapsed(&event)
    }
    match (host, device) {
        (HostBuffer::I8(h), DeviceGlobalBuffer::I8(d)) => do_read(d, h, queue),
        (HostBuffer::U8(h), DeviceGlobalBuffer::U8(d)) => do_read(d, h, queue),
        (HostBuffer::I16(h), DeviceGlobalBuffer::I16(d)) => do_read(d, h, queue),
        (HostBuffer::U16(h), DeviceGlobalBuffer::U16(d)) => do_read(d, h, queue),
        (HostBuffer::I32(h), DeviceGlobalBuffer::I32(d)) => do_read(d, h, queue),
        (HostBuffer::U32(h), DeviceGlobalBuffer::U32(d)) => do_read(d, h, queue),
        (HostBuffer::I64(h), DeviceGlobalBuffer::I64(d)) => do_read(d, h, queue),
        (HostBuffer::U64(h), DeviceGlobalBuffer::U64(d)) => do_read(d, h, queue),
        (HostBuffer::F32(h), DeviceGlobalBuffer::F32(d)) => do_read(d, h, queue),
        (HostBuffer::F64(h), DeviceGlobalBuffer::F64(d)) => do_read(d, h, queue),
        _ => unreachable!("host/device element type mismatch"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_eq_compares_scalars_by_value() {
        let a = ArgState::Scalar(ScalarValue::I32(3));
        let b = ArgState::Scalar(ScalarValue::I32(3));
        let c = ArgState::Scalar(ScalarValue::I32(4));
        assert!(args_eq(&a, &b));
        assert!(!args_eq(&a, &c));
    }

    #[test]
    fn args_eq_never_compares_local_scratch() {
        let a = ArgState::Local { element_type: ElementType::I32, len: 64 };
        let b = ArgState::Local { element_type: ElementType::I32, len: 64 };
        assert!(args_eq(&a, &b));
    }

    #[test]
    fn args_eq_rejects_mismatched_variants() {
        let scalar = ArgState::Scalar(ScalarValue::I32(3));
        let local = ArgState::Local { element_type: ElementType::I32, len: 64 };
        assert!(!args_eq(&scalar, &local));
    }

    #[test]
    fn scalar_from_size_casts_size_into_the_element_type() {
        assert_eq!(ScalarValue::from_size(ElementType::I32, 16), ScalarValue::I32(16));
        assert_eq!(ScalarValue::from_size(ElementType::F32, 16), ScalarValue::F32(16.0));
    }

    #[test]
    fn host_buffer_byte_len_matches_element_size() {
        let buf = HostBuffer::F32(vec![1.0, 2.0, 3.0]);
        assert_eq!(buf.byte_len(), 12);
    }
}
