// ============================================================
// Layer 5 — Compute Device Selection
// ============================================================
// The host/accelerator choice is made exactly once, at startup,
// from the `use_cuda` setting. Every tensor and the model then
// live on that one device for the whole run.
//
//   Host        → burn NdArray backend (always compiled)
//   Accelerator → burn Wgpu backend    (`wgpu` cargo feature)
//
// The accelerator is used only when it is requested AND usable:
// the build must include `wgpu` and a GPU adapter must exist at
// runtime. cubecl panics while creating its client when no
// adapter is found, so the check allocates one tiny tensor
// inside `catch_unwind`. Anything short of that falls back to
// the host with a DeviceUnavailable warning.

use std::panic::{self, AssertUnwindSafe};

use crate::domain::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeDevice {
    Host,
    Accelerator,
}

impl ComputeDevice {
    pub fn resolve(use_accelerator: bool) -> Self {
        Self::resolve_with(use_accelerator, accelerator_available)
    }

    /// Resolve with an explicit availability check.
    pub fn resolve_with<F>(use_accelerator: bool, available: F) -> Self
    where
        F: FnOnce() -> Result<(), DataError>,
    {
        if !use_accelerator {
            return Self::Host;
        }
        match available() {
            Ok(()) => Self::Accelerator,
            Err(e) => {
                tracing::warn!("{}; falling back to host", e);
                Self::Host
            }
        }
    }
}

/// Whether the accelerator backend is compiled in and has an adapter.
#[cfg(feature = "wgpu")]
pub fn accelerator_available() -> Result<(), DataError> {
    use burn::{
        backend::{wgpu::WgpuDevice, Wgpu},
        tensor::Tensor,
    };

    probe_device(|| {
        let device = WgpuDevice::default();
        let _ = Tensor::<Wgpu, 1>::zeros([1], &device).into_data();
    })
}

#[cfg(not(feature = "wgpu"))]
pub fn accelerator_available() -> Result<(), DataError> {
    Err(DataError::DeviceUnavailable)
}

/// Run a device initialisation, turning a panic into `DeviceUnavailable`.
#[cfg_attr(not(feature = "wgpu"), allow(dead_code))]
fn probe_device<F: FnOnce()>(init: F) -> Result<(), DataError> {
    panic::catch_unwind(AssertUnwindSafe(init)).map_err(|_| DataError::DeviceUnavailable)
}
