//! Device buffers of [`Real`].

use crate::context::OclContext;
use crate::error::{OpenClError, Result};
use commutator_bench::types::Real;
use opencl3::memory::{Buffer, CL_MEM_READ_ONLY, CL_MEM_READ_WRITE};
use opencl3::types::{cl_mem_flags, CL_BLOCKING};
use std::ptr;

/// Read/write access of a device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Access {
    fn flags(self) -> cl_mem_flags {
        match self {
            Access::ReadOnly => CL_MEM_READ_ONLY,
            Access::ReadWrite => CL_MEM_READ_WRITE,
        }
    }
}

/// Fixed-length device allocation with blocking transfers.
pub struct DeviceBuffer {
    inner: Buffer<Real>,
    len: usize,
    label: &'static str,
}

impl DeviceBuffer {
    /// Allocate `len` reals; `label` names the buffer in errors.
    pub fn alloc(ctx: &OclContext, len: usize, access: Access, label: &'static str) -> Result<Self> {
        // SAFETY: no host pointer is passed, the driver owns the allocation.
        let inner = unsafe {
            Buffer::<Real>::create(ctx.context(), access.flags(), len.max(1), ptr::null_mut())
                .map_err(|e| OpenClError::api(format!("create_buffer({label})"), e))?
        };
        Ok(Self { inner, len, label })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn raw(&self) -> &Buffer<Real> {
        &self.inner
    }

    /// Blocking host-to-device copy of the whole buffer.
    pub fn write(&mut self, ctx: &OclContext, data: &[Real]) -> Result<()> {
        self.check_len(data.len())?;
        if data.is_empty() {
            return Ok(());
        }
        // SAFETY: blocking write, `data` outlives the call.
        unsafe {
            ctx.queue()
                .enqueue_write_buffer(&mut self.inner, CL_BLOCKING, 0, data, &[])
                .map_err(|e| OpenClError::api(format!("enqueue_write_buffer({})", self.label), e))?;
        }
        Ok(())
    }

    /// Blocking device-to-host copy of the whole buffer.
    pub fn read(&self, ctx: &OclContext, dst: &mut [Real]) -> Result<()> {
        self.check_len(dst.len())?;
        if dst.is_empty() {
            return Ok(());
        }
        // SAFETY: blocking read, `dst` outlives the call.
        unsafe {
            ctx.queue()
                .enqueue_read_buffer(&self.inner, CL_BLOCKING, 0, dst, &[])
                .map_err(|e| OpenClError::api(format!("enqueue_read_buffer({})", self.label), e))?;
        }
        Ok(())
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.len {
            return Err(OpenClError::api(
                format!("transfer({})", self.label),
                format!("host slice has {len} reals, buffer has {}", self.len),
            ));
        }
        Ok(())
    }
}
