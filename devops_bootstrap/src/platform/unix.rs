// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Unix Platform Implementation
//!
//! Linux reads `/proc/meminfo`; macOS falls back to `sysctlbyname` since it
//! has no `/proc`. CPU count comes from `sysconf(_SC_NPROCESSORS_ONLN)` on
//! both.

use super::{Platform, PlatformError};
use async_trait::async_trait;

pub struct UnixPlatform;

impl UnixPlatform {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "linux")]
    fn memory_info() -> Result<(u64, u64), PlatformError> {
        let meminfo = std::fs::read_to_string("/proc/meminfo")
            .map_err(|e| PlatformError::Other(format!("failed to read /proc/meminfo: {e}")))?;

        let mut total = None;
        let mut available = None;
        for line in meminfo.lines() {
            if let Some(value) = line.strip_prefix("MemTotal:") {
                total = value.trim().split_whitespace().next().and_then(|s| s.parse::<u64>().ok()).map(|kb| kb * 1024);
            } else if let Some(value) = line.strip_prefix("MemAvailable:") {
                available = value.trim().split_whitespace().next().and_then(|s| s.parse::<u64>().ok()).map(|kb| kb * 1024);
            }
            if total.is_some() && available.is_some() {
                break;
            }
        }

        match (total, available) {
            (Some(t), Some(a)) => Ok((t, a)),
            _ => Err(PlatformError::Other("failed to parse /proc/meminfo".to_string())),
        }
    }

    #[cfg(target_os = "macos")]
    fn memory_info() -> Result<(u64, u64), PlatformError> {
        use std::mem;

        unsafe {
            let mut total: u64 = 0;
            let mut size = mem::size_of::<u64>();
            let name = b"hw.memsize\0".as_ptr() as *const i8;
            if libc::sysctlbyname(name, &mut total as *mut _ as *mut libc::c_void, &mut size, std::ptr::null_mut(), 0) != 0 {
                return Err(PlatformError::Other("sysctlbyname(hw.memsize) failed".to_string()));
            }

            // vm.page_free_count gives free pages, not total available memory
            // (cached/reclaimable pages aren't counted); good enough for a
            // dashboard gauge, not exact.
            let mut free_pages: u64 = 0;
            let mut avail_size = mem::size_of::<u64>();
            let avail_name = b"vm.page_free_count\0".as_ptr() as *const i8;
            let available = if libc::sysctlbyname(avail_name, &mut free_pages as *mut _ as *mut libc::c_void, &mut avail_size, std::ptr::null_mut(), 0) == 0 {
                free_pages * Self::page_size()
            } else {
                total / 2
            };

            Ok((total, available))
        }
    }

    #[cfg(target_os = "macos")]
    fn page_size() -> u64 {
        unsafe {
            let size = libc::sysconf(libc::_SC_PAGESIZE);
            if size > 0 {
                size as u64
            } else {
                4096
            }
        }
    }
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for UnixPlatform {
    fn cpu_count(&self) -> usize {
        unsafe {
            let count = libc::sysconf(libc::_SC_NPROCESSORS_ONLN);
            if count > 0 {
                count as usize
            } else {
                1
            }
        }
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            Self::memory_info().map(|(total, _)| total)
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Err(PlatformError::NotSupported("memory info not supported on this Unix variant".to_string()))
        }
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            Self::memory_info().map(|(_, available)| available)
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Err(PlatformError::NotSupported("memory info not supported on this Unix variant".to_string()))
        }
    }

    fn platform_name(&self) -> &'static str {
        #[cfg(target_os = "linux")]
        return "linux";
        #[cfg(target_os = "macos")]
        return "macos";
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        return "unix";
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_at_least_one_cpu() {
        let platform = UnixPlatform::new();
        assert!(platform.cpu_count() >= 1);
    }

    #[test]
    fn platform_name_is_one_of_the_known_unix_variants() {
        let platform = UnixPlatform::new();
        let name = platform.platform_name();
        assert!(name == "linux" || name == "macos" || name == "unix");
    }

    #[test]
    fn memory_is_nonzero_where_supported() {
        let platform = UnixPlatform::new();
        if let Ok(total) = platform.total_memory() {
            assert!(total > 0);
        }
        if let Ok(available) = platform.available_memory() {
            assert!(available > 0);
        }
    }
}
