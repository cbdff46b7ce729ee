use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::Device;
use tracing::{info, warn};

use crate::TARGET_LLM_REQUEST;

/// Where local inference runs. Chosen once at startup and handed to the
/// local generator; results do not depend on the choice.
#[derive(Debug, Clone)]
pub struct ComputeDevice {
    device: Device,
}

impl ComputeDevice {
    /// Pick an accelerator when one is usable, otherwise the CPU.
    pub fn select(prefer_accelerator: bool) -> Self {
        if !prefer_accelerator {
            return Self::cpu();
        }

        if cuda_is_available() {
            match Device::new_cuda(0) {
                Ok(device) => {
                    info!(target: TARGET_LLM_REQUEST, "Using CUDA device 0 for local inference");
                    return Self { device };
                }
                Err(e) => warn!(target: TARGET_LLM_REQUEST, "CUDA reported available but failed to initialize: {}", e),
            }
        }

        if metal_is_available() {
            match Device::new_metal(0) {
                Ok(device) => {
                    info!(target: TARGET_LLM_REQUEST, "Using Metal device 0 for local inference");
                    return Self { device };
                }
                Err(e) => warn!(target: TARGET_LLM_REQUEST, "Metal reported available but failed to initialize: {}", e),
            }
        }

        info!(target: TARGET_LLM_REQUEST, "No accelerator available, using CPU for local inference");
        Self::cpu()
    }

    pub fn cpu() -> Self {
        Self {
            device: Device::Cpu,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn is_accelerated(&self) -> bool {
        !self.device.is_cpu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_when_accelerator_not_wanted() {
        let device = ComputeDevice::select(false);
        assert!(!device.is_accelerated());
        assert!(device.device().is_cpu());
    }
}
