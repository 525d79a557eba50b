//! Provider, policy and key loading shared by the subcommands

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use sigalg_core::{KeySizePolicy, Provider, Registry, Settings, SignatureBinder};
use sigalg_key::{load_key_file, Key, PrivateKey, PublicKey};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

pub struct Context {
    registry: Registry,
    selected: Option<Arc<dyn Provider>>,
    policy: KeySizePolicy,
}

impl Context {
    pub fn new(settings: Settings) -> CliResult<Self> {
        let registry = Registry::default();
        let selected = match &settings.provider {
            Some(name) => Some(registry.provider(name).ok_or_else(|| {
                CliError::InvalidInput(format!(
                    "unknown provider {name}, available: {}",
                    registry.provider_names().join(", ")
                ))
            })?),
            None => None,
        };
        if let Some(provider) = &selected {
            info!(provider = provider.name(), "using configured provider");
        }
        Ok(Self {
            registry,
            selected,
            policy: KeySizePolicy::new(settings.pss),
        })
    }

    /// Settings from `path`, or the defaults when none is given
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let settings = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::FileNotFound(path.display().to_string()));
                }
                Settings::load(path)?
            }
            None => Settings::default(),
        };
        Self::new(settings)
    }

    pub fn provider(&self) -> &dyn Provider {
        match &self.selected {
            Some(provider) => provider.as_ref(),
            None => &self.registry,
        }
    }

    pub fn binder(&self) -> SignatureBinder<'_> {
        SignatureBinder::new(self.provider(), &self.policy)
    }
}

pub fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read(path)?)
}

pub fn load_private_key(path: &Path) -> CliResult<PrivateKey> {
    match load_keys(path)? {
        (Some(private), _) => Ok(private),
        (None, _) => Err(CliError::InvalidInput(format!(
            "{} holds a public key, signing needs a private key",
            path.display()
        ))),
    }
}

/// The public key of either a public or a private key file
pub fn load_public_key(path: &Path) -> CliResult<PublicKey> {
    Ok(load_keys(path)?.1)
}

/// Private key, if the file holds one, and the public key
pub fn load_keys(path: &Path) -> CliResult<(Option<PrivateKey>, PublicKey)> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let keys = load_key_file(path)?;
    debug!(path = %path.display(), algorithm = keys.1.algorithm(), "loaded key");
    Ok(keys)
}

/// Hex parameter bytes from the command line; `-` or empty means none
pub fn parse_hex_params(value: Option<&str>) -> CliResult<Option<Vec<u8>>> {
    match value.map(str::trim) {
        None | Some("") | Some("-") => Ok(None),
        Some(hex) => Ok(Some(hex::decode(hex)?)),
    }
}

pub fn default_output(input: &Path, extension: &str) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use sigalg_key::{EcCurve, EcKey};

    use super::*;

    #[test]
    fn test_default_context_uses_registry() {
        let ctx = Context::load(None).unwrap();
        assert_eq!(ctx.provider().name(), "Registry");
    }

    #[test]
    fn test_configured_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sigalg.toml");
        std::fs::write(&path, "provider = \"builtin\"\n").unwrap();

        let ctx = Context::load(Some(&path)).unwrap();
        assert_eq!(ctx.provider().name(), "Builtin");

        std::fs::write(&path, "provider = \"Hsm\"\n").unwrap();
        assert!(matches!(Context::load(Some(&path)), Err(CliError::InvalidInput(_))));

        assert!(matches!(
            Context::load(Some(&dir.path().join("missing.toml"))),
            Err(CliError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_parse_hex_params() {
        assert_eq!(parse_hex_params(None).unwrap(), None);
        assert_eq!(parse_hex_params(Some("-")).unwrap(), None);
        assert_eq!(parse_hex_params(Some(" 0500 ")).unwrap(), Some(vec![0x05, 0x00]));
        assert!(matches!(parse_hex_params(Some("zz")), Err(CliError::Hex(_))));
    }

    #[test]
    fn test_key_loading() {
        let dir = tempfile::tempdir().unwrap();
        let private_path = dir.path().join("ec.pem");
        let public_path = dir.path().join("ec.pub.pem");

        let key: PrivateKey = EcKey::generate(EcCurve::P256).into();
        std::fs::write(&private_path, key.to_pkcs8_pem().unwrap()).unwrap();
        std::fs::write(&public_path, key.public_key().to_spki_pem().unwrap()).unwrap();
        let spki = key.public_key().to_spki_der().unwrap();

        assert!(load_private_key(&private_path).is_ok());
        assert_eq!(load_public_key(&private_path).unwrap().to_spki_der().unwrap(), spki);
        assert_eq!(load_public_key(&public_path).unwrap().to_spki_der().unwrap(), spki);
        assert!(matches!(load_private_key(&public_path), Err(CliError::InvalidInput(_))));
        assert!(matches!(
            load_private_key(&dir.path().join("none.pem")),
            Err(CliError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("data/report.bin"), "sig.json"),
            PathBuf::from("data/report.bin.sig.json")
        );
    }
}
