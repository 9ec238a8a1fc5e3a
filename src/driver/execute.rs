//! Compile, cache, and run a single OpenCL kernel.

use ocl::{Context, Program, Queue};

use super::device::DriverConfig;
use super::payload::KernelPayload;
use super::prototype::KernelPrototype;
use super::timing::elapsed;
use super::DriverError;

/// A compiled kernel bound to one device context, ready to be run
/// repeatedly against different payloads.
///
/// `ocl::Kernel`'s builder bakes its queue in at build time (pyopencl lets
/// a single compiled kernel be enqueued against any queue at call time), so
/// this driver keeps the compiled [`Program`] around and builds a fresh
/// `ocl::Kernel` for each single-shot call rather than caching one.
pub struct KernelDriver {
    context: Context,
    queue: Queue,
    source: String,
    program: Program,
    prototype: KernelPrototype,
    /// Work-group sizes used across prior calls, for profiling summaries.
    pub wgsizes: Vec<usize>,
    /// Host<->device transfer byte totals across prior calls.
    pub transfers: Vec<usize>,
    /// Kernel execution times (ms) across prior calls.
    pub runtimes: Vec<f64>,
}

const MAX_LOCAL_WORK_SIZE: usize = 256;

impl KernelDriver {
    /// Compile `source` and bind to its single `__kernel` function.
    ///
    /// Fails with [`DriverError::UglyCode`] if `source` exposes anything
    /// other than exactly one kernel -- the dynamic-analysis contract this
    /// driver implements only makes sense for single-kernel programs.
    pub fn new(context: Context, queue: Queue, source: impl Into<String>) -> Result<Self, DriverError> {
        Self::with_config(context, queue, source, &DriverConfig::default())
    }

    /// As [`Self::new`], but `cfg.quiet_compiler` governs whether compiler
    /// diagnostics are suppressed (`-w`, threaded through
    /// `Program::builder().cmplr_opt(...)`) rather than left to print on a
    /// successful build with warnings -- the per-driver replacement for the
    /// original tool's process-wide `PYOPENCL_COMPILER_OUTPUT` env var (see
    /// Design Notes §9).
    pub fn with_config(
        context: Context,
        queue: Queue,
        source: impl Into<String>,
        cfg: &DriverConfig,
    ) -> Result<Self, DriverError> {
        let source = source.into();
        let prototypes = KernelPrototype::all_from_source(&source).map_err(DriverError::from)?;
        if prototypes.len() != 1 {
            return Err(DriverError::UglyCode(prototypes.len()));
        }
        let prototype = prototypes.into_iter().next().unwrap();

        let mut builder = Program::builder();
        builder.src(source.as_str()).devices(queue.device());
        if cfg.quiet_compiler {
            builder.cmplr_opt("-w");
        }
        let program = builder
            .build(&context)
            .map_err(|e| DriverError::BadCode(e.to_string()))?;

        tracing::info!(kernel = %prototype.name, "compiled kernel");

        Ok(Self {
            context,
            queue,
            source,
            program,
            prototype,
            wgsizes: Vec::new(),
            transfers: Vec::new(),
            runtimes: Vec::new(),
        })
    }

    pub fn prototype(&self) -> &KernelPrototype {
        &self.prototype
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run the kernel once against `payload`: upload inputs, enqueue,
    /// download outputs, and record the call's metrics.
    ///
    /// Returns the total round-trip elapsed time in milliseconds -- H→D
    /// transfer, kernel execution, and D→H transfer summed, matching §4.5
    /// steps 3/5/6/7 and the original's `elapsed += host_to_device(...) +
    /// get_event_time(event) + device_to_host(...)`. Transfer deltas are
    /// taken from the payload's own accumulators rather than assumed to
    /// start at zero, so a payload reused across more than one call still
    /// reports only this call's share.
    pub fn run_once(&mut self, payload: &mut KernelPayload) -> Result<f64, DriverError> {
        self.queue.finish().map_err(DriverError::from)?;

        let h2d_before = payload.h2d_millis();
        payload.host_to_device(&self.queue)?;
        let h2d_ms = payload.h2d_millis() - h2d_before;

        let mut builder = ocl::Kernel::builder();
        builder
            .program(&self.program)
            .name(&self.prototype.name)
            .queue(self.queue.clone())
            .global_work_size(payload.ndrange);

        let local_work_size = MAX_LOCAL_WORK_SIZE.min(payload.ndrange).max(1);
        builder.local_work_size(local_work_size);

        for arg in &payload.args {
            bind_arg(&mut builder, arg)?;
        }

        let kernel = builder.build().map_err(DriverError::from)?;

        let mut event = ocl::Event::empty();
        unsafe {
            kernel
                .cmd()
                .enew(&mut event)
                .enq()
                .map_err(DriverError::from)?;
        }
        let kernel_ms = elapsed(&event)?;

        let d2h_before = payload.d2h_millis();
        payload.device_to_host(&self.queue)?;
        let d2h_ms = payload.d2h_millis() - d2h_before;
        self.queue.finish().map_err(DriverError::from)?;

        let runtime = h2d_ms + kernel_ms + d2h_ms;

        let global_buffers: Vec<(&super::types::HostBuffer, bool)> = payload
            .args
            .iter()
            .filter_map(|a| match a {
                super::payload::ArgState::Global { host, is_const, .. } => Some((host, *is_const)),
                _ => None,
            })
            .collect();
        super::invariants::check_transfersize(&global_buffers, payload.transfersize);

        self.wgsizes.push(local_work_size);
        self.transfers.push(payload.transfersize);
        self.runtimes.push(runtime);

        Ok(runtime)
    }
}

fn bind_arg(builder: &mut ocl::builders::KernelBuilder, arg: &super::payload::ArgState) -> Result<(), DriverError> {
    use super::payload::ArgState;
    use super::types::{DeviceGlobalBuffer, ScalarValue};

    match arg {
        ArgState::Global { device, .. } => match device {
            DeviceGlobalBuffer::I8(b) => builder.arg(b),
            DeviceGlobalBuffer::U8(b) => builder.arg(b),
            DeviceGlobalBuffer::I16(b) => builder.arg(b),
            DeviceGlobalBuffer::U16(b) => builder.arg(b),
            DeviceGlobalBuffer::I32(b) => builder.arg(b),
            DeviceGlobalBuffer::U32(b) => builder.arg(b),
            DeviceGlobalBuffer::I64(b) => builder.arg(b),
            DeviceGlobalBuffer::U64(b) => builder.arg(b),
            DeviceGlobalBuffer::F32(b) => builder.arg(b),
            DeviceGlobalBuffer::F64(b) => builder.arg(b),
        },
        ArgState::Local { element_type, len } => {
            use super::types::ElementType;
            match element_type {
                ElementType::I8 => builder.arg_local::<i8>(*len),
                ElementType::U8 => builder.arg_local::<u8>(*len),
                ElementType::I16 => builder.arg_local::<i16>(*len),
                ElementType::U16 => builder.arg_local::<u16>(*len),
                ElementType::I32 => builder.arg_local::<i32>(*len),
                ElementType::U32 => builder.arg_local::<u32>(*len),
                ElementType::I64 => builder.arg_local::<i64>(*len),
                ElementType::U64 => builder.arg_local::<u64>(*len),
                ElementType::F32 => builder.arg_local::<f32>(*len),
                ElementType::F64 => builder.arg_local::<f64>(*len),
            }
        }
        ArgState::Scalar(v) => match v {
            ScalarValue::I8(x) => builder.arg(*x),
            ScalarValue::U8(x) => builder.arg(*x),
            ScalarValue::I16(x) => builder.arg(*x),
            ScalarValue::U16(x) => builder.arg(*x),
            ScalarValue::I32(x) => builder.arg(*x),
            ScalarValue::U32(x) => builder.arg(*x),
            ScalarValue::I64(x) => builder.arg(*x),
            ScalarValue::U64(x) => builder.arg(*x),
            ScalarValue::F32(x) => builder.arg(*x),
            ScalarValue::F64(x) => builder.arg(*x),
        },
    };
    Ok(())
}
