//! Reversible text atomization and OpenCL kernel dynamic analysis.
//!
//! This crate bundles two independent cores that share no state:
//!
//! - [`atomizer`]: a reversible tokenizer ([`atomizer::CharacterAtomizer`],
//!   [`atomizer::GreedyAtomizer`]) mapping text corpora to integer index
//!   sequences, for use as a preprocessing step ahead of a sequence model.
//! - [`driver`]: a dynamic-analysis harness ([`driver::KernelDriver`]) that
//!   compiles a single OpenCL kernel, synthesizes input data matching its
//!   argument signature, runs it on a device, and classifies it as valid or
//!   defective via a four-trial differential test.
//!
//! Neither core depends on the other; an application combining them (e.g. a
//! corpus-driven kernel fuzzer) is expected to own that wiring itself. This
//! crate does not install a `tracing` subscriber, read configuration files,
//! or provide a CLI entry point -- those are left to the embedding
//! application.

pub mod atomizer;
pub mod driver;
