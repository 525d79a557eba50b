//! Detached signature file written by `sign` and read by `verify`

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use sigalg_core::AlgorithmIdentifier;

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEnvelope {
    /// Canonical signature algorithm name
    pub algorithm: String,
    pub oid: String,
    /// DER `AlgorithmIdentifier`, hex
    pub identifier: String,
    /// DER parameters, hex; absent when the algorithm has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    pub signature: String,
}

impl SignatureEnvelope {
    pub fn new(identifier: &AlgorithmIdentifier, signature: &[u8]) -> CliResult<Self> {
        let parameters = identifier
            .params()
            .map(|spec| spec.to_der())
            .transpose()?
            .map(hex::encode);
        Ok(Self {
            algorithm: identifier.name().to_string(),
            oid: identifier.oid().to_string(),
            identifier: hex::encode(identifier.to_der()?),
            parameters,
            signature: hex::encode(signature),
        })
    }

    pub fn parameter_bytes(&self) -> CliResult<Option<Vec<u8>>> {
        Ok(self.parameters.as_deref().map(hex::decode).transpose()?)
    }

    pub fn signature_bytes(&self) -> CliResult<Vec<u8>> {
        Ok(hex::decode(&self.signature)?)
    }

    pub fn save(&self, path: &Path) -> CliResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_field_is_optional() {
        let json = r#"{
            "algorithm": "SHA256withECDSA",
            "oid": "1.2.840.10045.4.3.2",
            "identifier": "300a06082a8648ce3d040302",
            "signature": "3006020101020101"
        }"#;
        let envelope: SignatureEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.parameter_bytes().unwrap(), None);
        assert_eq!(envelope.signature_bytes().unwrap().len(), 8);

        let written = serde_json::to_string(&envelope).unwrap();
        assert!(!written.contains("parameters"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sig.json");
        let envelope = SignatureEnvelope {
            algorithm: "RSASSA-PSS".to_string(),
            oid: "1.2.840.113549.1.1.10".to_string(),
            identifier: String::new(),
            parameters: Some("3000".to_string()),
            signature: "00ff".to_string(),
        };
        envelope.save(&path).unwrap();

        let loaded = SignatureEnvelope::load(&path).unwrap();
        assert_eq!(loaded, envelope);
        assert_eq!(loaded.parameter_bytes().unwrap(), Some(vec![0x30, 0x00]));

        assert!(matches!(
            SignatureEnvelope::load(&dir.path().join("missing.json")),
            Err(CliError::FileNotFound(_))
        ));
    }
}
