// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Windows Platform Implementation
//!
//! `GlobalMemoryStatusEx` / `GetSystemInfo` via `winapi` when actually
//! compiled for Windows; stub values when cross-compiled from Unix so the
//! workspace still builds everywhere.

use super::{Platform, PlatformError};
use async_trait::async_trait;

pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }

    #[cfg(windows)]
    fn memory_info() -> Result<(u64, u64), PlatformError> {
        use std::mem;
        use winapi::um::sysinfoapi::{GlobalMemoryStatusEx, MEMORYSTATUSEX};

        unsafe {
            let mut mem_status: MEMORYSTATUSEX = mem::zeroed();
            mem_status.dwLength = mem::size_of::<MEMORYSTATUSEX>() as u32;
            if GlobalMemoryStatusEx(&mut mem_status) != 0 {
                Ok((mem_status.ullTotalPhys, mem_status.ullAvailPhys))
            } else {
                Err(PlatformError::Other("GlobalMemoryStatusEx failed".to_string()))
            }
        }
    }

    #[cfg(not(windows))]
    fn memory_info() -> Result<(u64, u64), PlatformError> {
        Err(PlatformError::NotSupported("Windows memory APIs not available on this platform".to_string()))
    }

    #[cfg(windows)]
    fn cpu_count_impl() -> usize {
        use std::mem;
        use winapi::um::sysinfoapi::{GetSystemInfo, SYSTEM_INFO};

        unsafe {
            let mut sys_info: SYSTEM_INFO = mem::zeroed();
            GetSystemInfo(&mut sys_info);
            sys_info.dwNumberOfProcessors as usize
        }
    }

    #[cfg(not(windows))]
    fn cpu_count_impl() -> usize {
        1
    }
}

impl Default for WindowsPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for WindowsPlatform {
    fn cpu_count(&self) -> usize {
        Self::cpu_count_impl()
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        Self::memory_info().map(|(total, _)| total)
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        Self::memory_info().map(|(_, available)| available)
    }

    fn platform_name(&self) -> &'static str {
        "windows"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_at_least_one_cpu() {
        let platform = WindowsPlatform::new();
        assert!(platform.cpu_count() >= 1);
    }

    #[test]
    fn platform_name_is_windows() {
        assert_eq!(WindowsPlatform::new().platform_name(), "windows");
    }
}
