//! Credential storage.
//!
//! API keys live in the OS keychain. Debug builds fall back to an
//! obfuscated file under the user config directory when no keychain is
//! available (headless dev machines, CI).

#[cfg(debug_assertions)]
use base64::Engine;
use keyring::Entry;
#[cfg(debug_assertions)]
use std::fs;
#[cfg(debug_assertions)]
use std::path::PathBuf;

const SERVICE_NAME: &str = "com.copydesk.review";
const PROVIDER: &str = "gemini";

/// Keychain-backed credential manager with a dev-mode file fallback
pub struct CredentialManager;

impl CredentialManager {
    /// Get the fallback file path for storing credentials (dev mode only)
    #[cfg(debug_assertions)]
    fn fallback_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("copydesk").join(format!("{}_key", PROVIDER)))
    }

    /// Store the API key in the keychain (file fallback in dev mode)
    pub fn store_api_key(api_key: &str) -> Result<(), String> {
        match Entry::new(SERVICE_NAME, PROVIDER) {
            Ok(entry) => {
                if entry.set_password(api_key).is_ok() {
                    tracing::info!("[Credentials] Stored API key in keychain");
                    return Ok(());
                }
            }
            Err(e) => {
                tracing::debug!("[Credentials] Keychain unavailable: {}", e);
            }
        }

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::fallback_path() {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| format!("Failed to create config directory: {}", e))?;
                }
                let encoded = base64::engine::general_purpose::STANDARD.encode(api_key);
                fs::write(&path, encoded)
                    .map_err(|e| format!("Failed to write API key: {}", e))?;
                tracing::warn!("[Credentials] DEV MODE: stored API key in file {:?}", path);
                return Ok(());
            }
            return Err("Could not determine config directory".to_string());
        }

        #[cfg(not(debug_assertions))]
        Err("Secure credential storage (keychain) unavailable".to_string())
    }

    /// Get the API key from the keychain (file fallback in dev mode)
    pub fn get_api_key() -> Result<String, String> {
        if let Ok(entry) = Entry::new(SERVICE_NAME, PROVIDER) {
            if let Ok(password) = entry.get_password() {
                return Ok(password);
            }
        }

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::fallback_path() {
                if path.exists() {
                    let encoded = fs::read_to_string(&path)
                        .map_err(|e| format!("Failed to read API key: {}", e))?;
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(encoded.trim())
                        .map_err(|e| format!("Corrupt API key file: {}", e))?;
                    return String::from_utf8(bytes)
                        .map_err(|e| format!("Corrupt API key file: {}", e));
                }
            }
        }

        Err("API key not found".to_string())
    }

    /// Delete the API key from the keychain and from file storage
    pub fn delete_api_key() -> Result<(), String> {
        if let Ok(entry) = Entry::new(SERVICE_NAME, PROVIDER) {
            let _ = entry.delete_credential();
        }

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::fallback_path() {
                if path.exists() {
                    fs::remove_file(&path)
                        .map_err(|e| format!("Failed to delete API key file: {}", e))?;
                }
            }
        }

        Ok(())
    }

    /// Check whether an API key is configured
    pub fn has_api_key() -> bool {
        Self::get_api_key().is_ok()
    }
}
