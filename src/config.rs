//! Configuration for the store.

/// Configuration for a [`KvStore`](crate::KvStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Pretty-print the persisted JSON document.
    pub pretty: bool,

    /// Validate the persisted document on load: the value index is
    /// recomputed from the primary map and the document is rejected on any
    /// mismatch. Disable to accept legacy or hand-edited files verbatim.
    pub verify_on_load: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            verify_on_load: true,
        }
    }
}

impl StoreConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether saved documents are pretty-printed.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set whether loaded documents are validated for self-consistency.
    pub fn with_verify_on_load(mut self, verify: bool) -> Self {
        self.verify_on_load = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.pretty);
        assert!(config.verify_on_load);
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new()
            .with_pretty(false)
            .with_verify_on_load(false);
        assert!(!config.pretty);
        assert!(!config.verify_on_load);
    }
}
