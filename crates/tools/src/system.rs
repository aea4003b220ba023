//! Host information for the assistant's "what machine am I on" questions.

use crate::{envelope, fields, Args, ToolResult};
use serde_json::{json, Value};
use sysinfo::System;

const MB: u64 = 1024 * 1024;

/// OS, kernel, host name, CPU count, memory and uptime.
pub fn system_info(args: &Value) -> Value {
    envelope(system_info_impl(args))
}

fn system_info_impl(args: &Value) -> ToolResult {
    Args::new(args)?;

    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu();

    // memory is in bytes
    Ok(fields(json!({
        "os_name": System::name(),
        "os_version": System::os_version(),
        "kernel_version": System::kernel_version(),
        "host_name": System::host_name(),
        "arch": std::env::consts::ARCH,
        "cpu_count": sys.cpus().len(),
        "total_memory_mb": sys.total_memory() / MB,
        "used_memory_mb": sys.used_memory() / MB,
        "uptime_seconds": System::uptime(),
    })))
}
