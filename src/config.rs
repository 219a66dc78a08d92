//! Immutable configuration for the default middleware library.

/// Values read by the built-in middleware.
///
/// Built once while assembling a stack and passed to the constructors that
/// need it. Nothing here changes after startup.
///
/// ```rust
/// use meddle::Config;
///
/// let config = Config::default().product("Edge").version("2.1");
/// assert_eq!(config.server_token(), "Edge/2.1");
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    product: String,
    version: String,
}

impl Config {
    pub fn new(product: impl Into<String>, version: impl Into<String>) -> Self {
        Self { product: product.into(), version: version.into() }
    }

    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// `<product>/<version>`, as appended to the `Server` header.
    pub fn server_token(&self) -> String {
        format!("{}/{}", self.product, self.version)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("Meddle", env!("CARGO_PKG_VERSION"))
    }
}
