/// Environment and client configuration for the Synapse API.
use std::time::Duration;

/// Default per-request timeout applied by the transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Supported Synapse environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// Map the `development_mode` flag onto an environment.
    pub fn from_development_mode(development_mode: bool) -> Self {
        if development_mode {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }
}

/// Base URL for a specific environment.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub api_base: String,
}

impl EnvironmentConfig {
    pub fn from_environment(environment: Environment) -> Self {
        match environment {
            Environment::Sandbox => Self {
                api_base: "https://uat-api.synapsefi.com/v3.1".into(),
            },
            Environment::Production => Self {
                api_base: "https://api.synapsefi.com/v3.1".into(),
            },
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self::from_environment(Environment::Sandbox)
    }
}

/// Everything the client needs at construction time.
///
/// `fingerprint` defaults to empty, `development_mode` to `true` (sandbox),
/// `raise_for_202` to `false` and `timeout` to [`DEFAULT_TIMEOUT`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub ip_address: String,
    pub fingerprint: String,
    pub development_mode: bool,
    /// Treat `http_code == "202"` responses as failures.
    pub raise_for_202: bool,
    pub timeout: Duration,
    /// Overrides the environment base URL (mock servers, proxies).
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ip_address: ip_address.into(),
            fingerprint: String::new(),
            development_mode: true,
            raise_for_202: false,
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }

    pub fn fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn development_mode(mut self, development_mode: bool) -> Self {
        self.development_mode = development_mode;
        self
    }

    pub fn raise_for_202(mut self, raise_for_202: bool) -> Self {
        self.raise_for_202 = raise_for_202;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn environment(&self) -> Environment {
        Environment::from_development_mode(self.development_mode)
    }

    /// The base URL requests are resolved against.
    pub fn api_base(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => EnvironmentConfig::from_environment(self.environment()).api_base,
        }
    }
}
