use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Transport mode for an upload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    /// Standard cross-origin request; the response status is inspected
    #[serde(rename = "cors")]
    Cors,
    /// Fire-and-forget request; the response is opaque and cannot be read
    #[serde(rename = "no-cors")]
    Opaque,
}

/// Endpoint and transport configuration for the upload pipeline.
///
/// Two deployment variants of the asset service exist; the CORS-capable
/// runtime endpoint is the default primary and the static-host endpoint
/// (opaque responses only) is the default fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    #[serde(rename = "projectApiUrl")]
    pub project_api_url: String,
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    #[serde(rename = "uploadTransport")]
    pub upload_transport: TransportMode,
    #[serde(rename = "fallbackUploadUrl")]
    pub fallback_upload_url: String,
    #[serde(rename = "fallbackTransport")]
    pub fallback_transport: TransportMode,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            project_api_url: "https://btci3qnv43.execute-api.us-east-1.amazonaws.com"
                .to_string(),
            upload_url:
                "https://275323-918sangriatortoise-stage.adobeioruntime.net/api/v1/web/dx-excshell-1/assets"
                    .to_string(),
            upload_transport: TransportMode::Cors,
            fallback_upload_url:
                "https://275323-918sangriatortoise-stage.adobeio-static.net/api/v1/web/dx-excshell-1/assets"
                    .to_string(),
            fallback_transport: TransportMode::Opaque,
        }
    }
}

pub fn get_config_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(home_dir) = dirs::home_dir() {
        Ok(home_dir.join(".copilot-sync"))
    } else {
        Err("Could not find home directory".into())
    }
}

pub fn get_config_file_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(get_config_dir()?.join("config.json"))
}

pub fn get_logs_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(get_config_dir()?.join("logs"))
}

pub fn ensure_config_dir() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;

        // Set permissions to 700 (read/write/execute for owner only) on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = fs::metadata(&config_dir)?;
            let mut permissions = metadata.permissions();
            permissions.set_mode(0o700);
            fs::set_permissions(&config_dir, permissions)?;
        }
    }
    Ok(())
}

pub fn ensure_logs_dir() -> Result<(), Box<dyn std::error::Error>> {
    let logs_dir = get_logs_dir()?;
    if !logs_dir.exists() {
        fs::create_dir_all(&logs_dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = fs::metadata(&logs_dir)?;
            let mut permissions = metadata.permissions();
            permissions.set_mode(0o700);
            fs::set_permissions(&logs_dir, permissions)?;
        }
    }
    Ok(())
}

pub fn load_config() -> Result<UploaderConfig, Box<dyn std::error::Error>> {
    ensure_config_dir()?;
    read_config_file(&get_config_file_path()?)
}

pub fn save_config(config: &UploaderConfig) -> Result<(), Box<dyn std::error::Error>> {
    ensure_config_dir()?;
    write_config_file(&get_config_file_path()?, config)
}

fn read_config_file(config_file: &Path) -> Result<UploaderConfig, Box<dyn std::error::Error>> {
    if config_file.exists() {
        let content = fs::read_to_string(config_file)?;
        let config: UploaderConfig = serde_json::from_str(&content)?;
        Ok(config)
    } else {
        Ok(UploaderConfig::default())
    }
}

fn write_config_file(
    config_file: &Path,
    config: &UploaderConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string_pretty(config)?;

    fs::write(config_file, content)?;

    // Set permissions to 600 (read/write for owner only) on Unix systems
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(config_file)?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(0o600);
        fs::set_permissions(config_file, permissions)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_pairs_cors_primary_with_opaque_fallback() {
        let config = UploaderConfig::default();
        assert_eq!(config.upload_transport, TransportMode::Cors);
        assert_eq!(config.fallback_transport, TransportMode::Opaque);
        assert_ne!(config.upload_url, config.fallback_upload_url);
    }

    #[test]
    fn test_transport_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&TransportMode::Cors).unwrap(),
            "\"cors\""
        );
        assert_eq!(
            serde_json::to_string(&TransportMode::Opaque).unwrap(),
            "\"no-cors\""
        );
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_file = temp_dir.path().join("config.json");

        let config = read_config_file(&config_file).unwrap();
        assert_eq!(config.upload_transport, TransportMode::Cors);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_file = temp_dir.path().join("config.json");

        let mut config = UploaderConfig::default();
        config.upload_url = "https://example.com/assets".to_string();
        config.upload_transport = TransportMode::Opaque;

        write_config_file(&config_file, &config).unwrap();
        let loaded = read_config_file(&config_file).unwrap();

        assert_eq!(loaded.upload_url, "https://example.com/assets");
        assert_eq!(loaded.upload_transport, TransportMode::Opaque);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&config_file).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_config_roundtrip_uses_camel_case_keys() {
        let config = UploaderConfig::default();
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("\"projectApiUrl\""));
        assert!(json.contains("\"uploadUrl\""));
        assert!(json.contains("\"fallbackUploadUrl\""));
        assert!(json.contains("\"uploadTransport\":\"cors\""));

        let parsed: UploaderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.project_api_url, config.project_api_url);
        assert_eq!(parsed.fallback_transport, TransportMode::Opaque);
    }
}
