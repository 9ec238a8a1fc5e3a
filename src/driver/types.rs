//! Dynamically-typed scalars and buffers.
//!
//! A [`KernelPrototype`](super::prototype::KernelPrototype) is only known at
//! runtime, so argument storage can't be generic over a single Rust type the
//! way a single `Buffer<T>` call site would be. Each of these enums is a
//! small tagged union over the element types OpenCL kernels are actually
//! built against, dispatched once at payload-construction time.

use ocl::OclPrm;

/// The scalar element type backing a kernel argument, independent of
/// pointer-ness or vector width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ElementType {
    /// Map a bare OpenCL type name (`float`, `uchar`, `long`, ...) to its
    /// element type. Returns `None` for types this driver cannot synthesize
    /// payloads for (`image2d_t`, `sampler_t`, `event_t`, ...).
    pub fn from_bare_type(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "cl_char" => Self::I8,
            "uchar" | "unsigned char" | "cl_uchar" => Self::U8,
            "short" | "cl_short" => Self::I16,
            "ushort" | "unsigned short" | "cl_ushort" => Self::U16,
            "int" | "cl_int" => Self::I32,
            "uint" | "unsigned int" | "unsigned" | "cl_uint" => Self::U32,
            "long" | "cl_long" => Self::I64,
            "ulong" | "unsigned long" | "cl_ulong" => Self::U64,
            "float" | "cl_float" => Self::F32,
            "double" | "cl_double" => Self::F64,
            _ => return None,
        })
    }

    /// Size in bytes of one element.
    pub fn size_of(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }
}

/// Generates matching [`HostBuffer`] payloads for a given `count` of
/// elements.
pub trait PayloadGenerator {
    fn sequential(self, count: usize) -> HostBuffer;
    fn random(self, count: usize) -> HostBuffer;
}

impl PayloadGenerator for ElementType {
    fn sequential(self, count: usize) -> HostBuffer {
        macro_rules! seq {
            ($variant:ident, $t:ty) => {
                HostBuffer::$variant((0..count).map(|i| i as $t).collect())
            };
        }
        match self {
            Self::I8 => seq!(I8, i8),
            Self::U8 => seq!(U8, u8),
            Self::I16 => seq!(I16, i16),
            Self::U16 => seq!(U16, u16),
            Self::I32 => seq!(I32, i32),
            Self::U32 => seq!(U32, u32),
            Self::I64 => seq!(I64, i64),
            Self::U64 => seq!(U64, u64),
            Self::F32 => seq!(F32, f32),
            Self::F64 => seq!(F64, f64),
        }
    }

    fn random(self, count: usize) -> HostBuffer {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        macro_rules! rnd {
            ($variant:ident, $t:ty) => {
                HostBuffer::$variant((0..count).map(|_| rng.gen::<$t>()).collect())
            };
        }
        match self {
            Self::I8 => rnd!(I8, i8),
            Self::U8 => rnd!(U8, u8),
            Self::I16 => rnd!(I16, i16),
            Self::U16 => rnd!(U16, u16),
            Self::I32 => rnd!(I32, i32),
            Self::U32 => rnd!(U32, u32),
            Self::I64 => rnd!(I64, i64),
            Self::U64 => rnd!(U64, u64),
            Self::F32 => rnd!(F32, f32),
            Self::F64 => rnd!(F64, f64),
        }
    }
}

/// Host-side storage for a global-memory argument, tagged by element type.
#[derive(Debug, Clone, PartialEq)]
pub enum HostBuffer {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl HostBuffer {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::I8(_) => ElementType::I8,
            Self::U8(_) => ElementType::U8,
            Self::I16(_) => ElementType::I16,
            Self::U16(_) => ElementType::U16,
            Self::I32(_) => ElementType::I32,
            Self::U32(_) => ElementType::U32,
            Self::I64(_) => ElementType::I64,
            Self::U64(_) => ElementType::U64,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte size of the buffer's backing storage.
    pub fn byte_len(&self) -> usize {
        self.len() * self.element_type().size_of()
    }
}

/// Device-side storage for a global-memory argument, tagged by element type.
///
/// `ocl::Buffer<T>` requires `T: OclPrm`, so this enum exists purely to let
/// [`super::payload::KernelPayload`] hold one without being generic itself.
pub enum DeviceGlobalBuffer {
    I8(ocl::Buffer<i8>),
    U8(ocl::Buffer<u8>),
    I16(ocl::Buffer<i16>),
    U16(ocl::Buffer<u16>),
    I32(ocl::Buffer<i32>),
    U32(ocl::Buffer<u32>),
    I64(ocl::Buffer<i64>),
    U64(ocl::Buffer<u64>),
    F32(ocl::Buffer<f32>),
    F64(ocl::Buffer<f64>),
}

impl DeviceGlobalBuffer {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::I8(_) => ElementType::I8,
            Self::U8(_) => ElementType::U8,
            Self::I16(_) => ElementType::I16,
            Self::U16(_) => ElementType::U16,
            Self::I32(_) => ElementType::I32,
            Self::U32(_) => ElementType::U32,
            Self::I64(_) => ElementType::I64,
            Self::U64(_) => ElementType::U64,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::I8(b) => b.len(),
            Self::U8(b) => b.len(),
            Self::I16(b) => b.len(),
            Self::U16(b) => b.len(),
            Self::I32(b) => b.len(),
            Self::U32(b) => b.len(),
            Self::I64(b) => b.len(),
            Self::U64(b) => b.len(),
            Self::F32(b) => b.len(),
            Self::F64(b) => b.len(),
        }
    }
}

/// A scalar (non-pointer, non-local) kernel argument value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl ScalarValue {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::I8(_) => ElementType::I8,
            Self::U8(_) => ElementType::U8,
            Self::I16(_) => ElementType::I16,
            Self::U16(_) => ElementType::U16,
            Self::I32(_) => ElementType::I32,
            Self::U32(_) => ElementType::U32,
            Self::I64(_) => ElementType::I64,
            Self::U64(_) => ElementType::U64,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
        }
    }

    pub fn zero(ty: ElementType) -> Self {
        Self::from_size(ty, 0)
    }

    /// A scalar argument's synthesized device-side value: the payload's
    /// element count itself, cast to the argument's element type. Matches
    /// `dtype(size)` in the original driver -- a scalar like a bound check
    /// `n` in `if (i < n)` is set to the launch size so every generated
    /// index is in range.
    pub fn from_size(ty: ElementType, size: usize) -> Self {
        match ty {
            ElementType::I8 => Self::I8(size as i8),
            ElementType::U8 => Self::U8(size as u8),
            ElementType::I16 => Self::I16(size as i16),
            ElementType::U16 => Self::U16(size as u16),
            ElementType::I32 => Self::I32(size as i32),
            ElementType::U32 => Self::U32(size as u32),
            ElementType::I64 => Self::I64(size as i64),
            ElementType::U64 => Self::U64(size as u64),
            ElementType::F32 => Self::F32(size as f32),
            ElementType::F64 => Self::F64(size as f64),
        }
    }
}

/// Static assertion that `OclPrm` stays in scope for buffer construction
/// call sites built from this module's enums.
#[allow(dead_code)]
fn _assert_ocl_prm<T: OclPrm>() {}
