pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod fx;
pub(crate) mod fx_cpu;
#[cfg(feature = "gpu")]
pub(crate) mod gpu;
pub(crate) mod surface;
