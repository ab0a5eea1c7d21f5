//! Registry credentials: explicit, environment, Docker config, anonymous.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use oci_distribution::secrets::RegistryAuth;
use serde::Deserialize;

pub const ENV_USERNAME: &str = "REGISTRY_USERNAME";
pub const ENV_PASSWORD: &str = "REGISTRY_PASSWORD";

/// Where the credentials in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Explicit,
    Environment,
    DockerConfig,
    Anonymous,
}

/// Resolved credentials for one registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub source: AuthSource,
    basic: Option<(String, String)>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self {
            source: AuthSource::Anonymous,
            basic: None,
        }
    }

    pub fn basic(source: AuthSource, username: &str, password: &str) -> Self {
        Self {
            source,
            basic: Some((username.to_string(), password.to_string())),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.basic.as_ref().map(|(u, _)| u.as_str())
    }

    pub fn to_oci_auth(&self) -> RegistryAuth {
        match &self.basic {
            Some((u, p)) => RegistryAuth::Basic(u.clone(), p.clone()),
            None => RegistryAuth::Anonymous,
        }
    }

    /// Explicit pair, then environment, then Docker config, then anonymous.
    ///
    /// Explicit credentials only count when both parts are non-empty.
    pub fn resolve(registry: &str, explicit: Option<(&str, &str)>) -> Self {
        Self::resolve_with(
            registry,
            explicit,
            |key| std::env::var(key).ok(),
            docker_config_path().as_deref(),
        )
    }

    /// [`Credentials::resolve`] with injectable environment and config file.
    pub fn resolve_with(
        registry: &str,
        explicit: Option<(&str, &str)>,
        env: impl Fn(&str) -> Option<String>,
        docker_config: Option<&Path>,
    ) -> Self {
        if let Some((u, p)) = explicit.filter(|(u, p)| !u.is_empty() && !p.is_empty()) {
            return Self::basic(AuthSource::Explicit, u, p);
        }
        if let (Some(u), Some(p)) = (env(ENV_USERNAME), env(ENV_PASSWORD)) {
            if !u.is_empty() && !p.is_empty() {
                return Self::basic(AuthSource::Environment, &u, &p);
            }
        }
        if let Some((u, p)) = docker_config.and_then(|path| from_docker_config(path, registry)) {
            return Self::basic(AuthSource::DockerConfig, &u, &p);
        }
        Self::anonymous()
    }
}

/// `$DOCKER_CONFIG/config.json`, else `~/.docker/config.json`.
pub fn docker_config_path() -> Option<PathBuf> {
    match std::env::var_os("DOCKER_CONFIG") {
        Some(dir) => Some(PathBuf::from(dir).join("config.json")),
        None => dirs::home_dir().map(|h| h.join(".docker").join("config.json")),
    }
}

#[derive(Debug, Default, Deserialize)]
struct DockerConfig {
    #[serde(default)]
    auths: HashMap<String, DockerAuthEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct DockerAuthEntry {
    #[serde(default)]
    auth: Option<String>,
}

/// Read `auths.<registry>.auth` (base64 `user:pass`) from a Docker config.
///
/// Keys may carry a scheme or path (`https://index.docker.io/v1/`); they are
/// compared by host.
pub fn from_docker_config(path: &Path, registry: &str) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let config: DockerConfig = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Ignoring unreadable {}: {e}", path.display());
            return None;
        }
    };

    let entry = config
        .auths
        .iter()
        .find(|(key, _)| registry_host(key) == registry)
        .map(|(_, entry)| entry)?;
    let decoded = STANDARD.decode(entry.auth.as_deref()?.trim()).ok()?;
    let pair = String::from_utf8(decoded).ok()?;
    let (u, p) = pair.split_once(':')?;
    tracing::debug!("using credentials for {registry} from {}", path.display());
    Some((u.to_string(), p.to_string()))
}

fn registry_host(key: &str) -> &str {
    let key = key
        .strip_prefix("https://")
        .or_else(|| key.strip_prefix("http://"))
        .unwrap_or(key);
    key.split('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_host_strips_scheme_and_path() {
        assert_eq!(registry_host("https://index.docker.io/v1/"), "index.docker.io");
        assert_eq!(registry_host("localhost:5000"), "localhost:5000");
    }

    #[test]
    fn anonymous_maps_to_oci_anonymous() {
        assert!(matches!(
            Credentials::anonymous().to_oci_auth(),
            RegistryAuth::Anonymous
        ));
    }

    #[test]
    fn basic_maps_to_oci_basic() {
        let c = Credentials::basic(AuthSource::Explicit, "u", "p");
        assert!(matches!(c.to_oci_auth(), RegistryAuth::Basic(_, _)));
        assert_eq!(c.username(), Some("u"));
    }
}
