//! Device selection and the command queue.

use crate::error::{OpenClError, Result};
use opencl3::command_queue::{CommandQueue, CL_QUEUE_PROFILING_ENABLE};
use opencl3::context::Context;
use opencl3::device::{
    Device, CL_DEVICE_TYPE_ACCELERATOR, CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_GPU,
};
use opencl3::platform::get_platforms;
use opencl3::types::cl_device_type;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Kind of device to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    /// First device of any type.
    #[default]
    Any,
    Gpu,
    Cpu,
    Accelerator,
}

impl DeviceKind {
    fn cl_type(self) -> cl_device_type {
        match self {
            DeviceKind::Any => CL_DEVICE_TYPE_ALL,
            DeviceKind::Gpu => CL_DEVICE_TYPE_GPU,
            DeviceKind::Cpu => CL_DEVICE_TYPE_CPU,
            DeviceKind::Accelerator => CL_DEVICE_TYPE_ACCELERATOR,
        }
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" | "all" => Ok(DeviceKind::Any),
            "gpu" => Ok(DeviceKind::Gpu),
            "cpu" => Ok(DeviceKind::Cpu),
            "accelerator" | "acc" => Ok(DeviceKind::Accelerator),
            other => Err(format!("unknown device type '{other}'")),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceKind::Any => "any",
            DeviceKind::Gpu => "gpu",
            DeviceKind::Cpu => "cpu",
            DeviceKind::Accelerator => "accelerator",
        };
        f.write_str(s)
    }
}

/// A device with its context and a profiling-enabled in-order queue.
pub struct OclContext {
    device: Device,
    context: Context,
    queue: CommandQueue,
    kind: DeviceKind,
    platform_name: String,
    device_name: String,
}

// SAFETY: OpenCL handles are reference counted by the driver and may be used
// from any thread; the in-order queue serialises commands.
unsafe impl Send for OclContext {}
unsafe impl Sync for OclContext {}

impl fmt::Debug for OclContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OclContext")
            .field("kind", &self.kind)
            .field("platform_name", &self.platform_name)
            .field("device_name", &self.device_name)
            .finish()
    }
}

impl OclContext {
    /// Open the first device of `kind` across all platforms.
    pub fn new(kind: DeviceKind) -> Result<Self> {
        let platforms = get_platforms().map_err(|e| OpenClError::api("get_platforms", e))?;
        if platforms.is_empty() {
            return Err(OpenClError::NoDevice("no OpenCL platforms found".into()));
        }

        for platform in &platforms {
            let platform_name = platform.name().unwrap_or_default();
            debug!(platform = %platform_name, "checking OpenCL platform");

            let ids = platform.get_devices(kind.cl_type()).unwrap_or_default();
            if let Some(&id) = ids.first() {
                let device = Device::new(id);
                let device_name = device.name().unwrap_or_default();
                let context = Context::from_device(&device)
                    .map_err(|e| OpenClError::api("create_context", e))?;
                let queue =
                    CommandQueue::create_default_with_properties(&context, CL_QUEUE_PROFILING_ENABLE, 0)
                        .map_err(|e| OpenClError::api("create_command_queue", e))?;

                info!(platform = %platform_name, device = %device_name, %kind, "selected OpenCL device");
                return Ok(Self {
                    device,
                    context,
                    queue,
                    kind,
                    platform_name,
                    device_name,
                });
            }
        }

        Err(OpenClError::NoDevice(format!("no {kind} device on any platform")))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn platform_name(&self) -> &str {
        &self.platform_name
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Whether the device supports double precision.
    pub fn supports_fp64(&self) -> bool {
        self.device
            .extensions()
            .map(|ext| ext.contains("cl_khr_fp64"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_kind_parse() {
        assert_eq!("GPU".parse::<DeviceKind>().unwrap(), DeviceKind::Gpu);
        assert_eq!("acc".parse::<DeviceKind>().unwrap(), DeviceKind::Accelerator);
        assert!("fpga".parse::<DeviceKind>().is_err());
        assert_eq!(DeviceKind::Cpu.to_string(), "cpu");
    }

    #[test]
    fn test_context_creation() {
        match OclContext::new(DeviceKind::Any) {
            Ok(ctx) => assert!(!ctx.device_name().is_empty()),
            Err(_) => println!("OpenCL not available, skipping test"),
        }
    }
}
