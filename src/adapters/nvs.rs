//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`CredentialStore`] for the provisioning machine.  Both
//! credentials live as NVS strings in the `credentials` namespace.
//!
//! - Atomic writes: ESP-IDF NVS commits are atomic per nvs_commit(), so a
//!   value is durable once `set` returns.
//! - The simulation backend keeps a plain in-memory map (dev/test only).

use heapless::String;
use log::{info, warn};

use crate::app::ports::{CREDENTIAL_NAMESPACE, CredentialStore, PASSPHRASE_CAPACITY, StorageError};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// NVS key and namespace names are limited to 15 bytes plus NUL.
#[cfg(target_os = "espidf")]
const NVS_NAME_LEN: usize = 16;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<std::string::String, std::string::String>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        })
    }

    /// NUL-terminated copy of an NVS name, truncated to 15 bytes.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_NAME_LEN] {
        let mut buf = [0u8; NVS_NAME_LEN];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NVS_NAME_LEN - 1);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open the credential namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(CREDENTIAL_NAMESPACE);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: `ns` is NUL-terminated and outlives the call.
        let ret = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: `handle` was opened above and is closed exactly once.
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn commit(handle: nvs_handle_t) -> Result<(), i32> {
        // SAFETY: `handle` is open for writing.
        let ret = unsafe { nvs_commit(handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
fn storage_error(rc: i32) -> StorageError {
    if rc == ESP_ERR_NVS_NOT_FOUND as i32 {
        StorageError::NotFound
    } else if rc == ESP_ERR_NVS_NOT_ENOUGH_SPACE as i32 {
        StorageError::Full
    } else {
        StorageError::IoError
    }
}

impl CredentialStore for NvsAdapter {
    fn get(&self, key: &str) -> String<PASSPHRASE_CAPACITY> {
        let mut out = String::new();

        #[cfg(not(target_os = "espidf"))]
        if let Some(value) = self.store.get(key) {
            if out.push_str(value).is_err() {
                warn!("NvsAdapter: {} exceeds {} bytes, ignoring", key, PASSPHRASE_CAPACITY);
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key_c = Self::c_name(key);
            let result = Self::with_nvs_handle(false, |handle| {
                let mut buf = [0u8; PASSPHRASE_CAPACITY + 1];
                let mut size = buf.len();
                // SAFETY: `buf` holds `size` bytes; NVS writes at most that.
                let ret = unsafe {
                    nvs_get_str(handle, key_c.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok((buf, size.saturating_sub(1)))
            });
            match result {
                Ok((buf, len)) => match core::str::from_utf8(&buf[..len]) {
                    Ok(text) => {
                        let _ = out.push_str(text);
                    }
                    Err(_) => warn!("NvsAdapter: {} is not UTF-8, ignoring", key),
                },
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => {}
                Err(e) => warn!("NvsAdapter: read {} failed (rc={})", key, e),
            }
        }

        out
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if value.len() > PASSPHRASE_CAPACITY {
            return Err(StorageError::Full);
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.store.insert(key.into(), value.into());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key_c = Self::c_name(key);
            let mut value_c = [0u8; PASSPHRASE_CAPACITY + 1];
            value_c[..value.len()].copy_from_slice(value.as_bytes());
            Self::with_nvs_handle(true, |handle| {
                // SAFETY: both buffers are NUL-terminated.
                let ret = unsafe {
                    nvs_set_str(handle, key_c.as_ptr().cast(), value_c.as_ptr().cast())
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Self::commit(handle)
            })
            .map_err(storage_error)
        }
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store.clear();
            info!("NvsAdapter: {} cleared (simulation)", CREDENTIAL_NAMESPACE);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            Self::with_nvs_handle(true, |handle| {
                // SAFETY: `handle` is open for writing.
                let ret = unsafe { nvs_erase_all(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Self::commit(handle)
            })
            .map_err(storage_error)?;
            info!("NvsAdapter: {} cleared", CREDENTIAL_NAMESPACE);
            Ok(())
        }
    }
}
