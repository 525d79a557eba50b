use std::sync::Arc;

use const_oid::ObjectIdentifier;
use tracing::debug;

use super::{BuiltinProvider, Provider, ProviderError, SignatureEngine};
use crate::params::{AlgorithmParameters, EcParams};

/// Ordered provider list; the first provider that answers wins
#[derive(Clone)]
pub struct Registry {
    providers: Vec<Arc<dyn Provider>>,
}

impl Registry {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Append a provider at the lowest priority
    pub fn push(&mut self, provider: Arc<dyn Provider>) {
        self.providers.push(provider);
    }

    /// Look up a provider by its name (case-insensitive)
    pub fn provider(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    fn first_ok<T>(
        &self,
        what: &str,
        mut f: impl FnMut(&dyn Provider) -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        let mut last = None;
        for provider in &self.providers {
            match f(provider.as_ref()) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(provider = provider.name(), %what, error = %e, "provider declined");
                    last = Some(e);
                }
            }
        }
        Err(last.unwrap_or_else(|| ProviderError::NoSuchAlgorithm(what.to_string())))
    }
}

impl Default for Registry {
    /// A registry holding only the built-in provider
    fn default() -> Self {
        Self::new(vec![Arc::new(BuiltinProvider::new())])
    }
}

impl Provider for Registry {
    fn name(&self) -> &str {
        "Registry"
    }

    fn signature(&self, algorithm: &str) -> Result<Box<dyn SignatureEngine>, ProviderError> {
        self.first_ok(algorithm, |p| p.signature(algorithm))
    }

    fn parameters(&self, algorithm: &str, der: &[u8]) -> Result<AlgorithmParameters, ProviderError> {
        self.first_ok(algorithm, |p| p.parameters(algorithm, der))
    }

    fn ec_parameter_spec(&self, der: &[u8]) -> Option<EcParams> {
        self.providers.iter().find_map(|p| p.ec_parameter_spec(der))
    }

    fn algorithm_oid(&self, name: &str) -> Option<ObjectIdentifier> {
        self.providers.iter().find_map(|p| p.algorithm_oid(name))
    }
}
