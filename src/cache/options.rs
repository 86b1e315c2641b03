/// Per-request cache lookup options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMetadataOptions {
    check_ttl: bool,
    use_cache_only: bool,
    validate: bool,
    forced_revision: Option<String>,
    resolver_name: Option<String>,
}

impl Default for CacheMetadataOptions {
    fn default() -> Self {
        Self {
            check_ttl: true,
            use_cache_only: false,
            validate: false,
            forced_revision: None,
            resolver_name: None,
        }
    }
}

impl CacheMetadataOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check_ttl(mut self, check_ttl: bool) -> Self {
        self.check_ttl = check_ttl;
        self
    }

    pub fn with_use_cache_only(mut self, use_cache_only: bool) -> Self {
        self.use_cache_only = use_cache_only;
        self
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Look up this exact revision instead of the requested token
    pub fn with_forced_revision(mut self, revision: impl Into<String>) -> Self {
        self.forced_revision = Some(revision.into());
        self
    }

    /// Resolver whose resolved-revision mappings are consulted
    pub fn with_resolver_name(mut self, name: impl Into<String>) -> Self {
        self.resolver_name = Some(name.into());
        self
    }

    pub fn check_ttl(&self) -> bool {
        self.check_ttl
    }

    pub fn use_cache_only(&self) -> bool {
        self.use_cache_only
    }

    pub fn validate(&self) -> bool {
        self.validate
    }

    pub fn forced_revision(&self) -> Option<&str> {
        self.forced_revision.as_deref()
    }

    pub fn resolver_name(&self) -> Option<&str> {
        self.resolver_name.as_deref()
    }

    /// TTL is only enforced when a live resolver could refresh the entry
    pub fn effective_check_ttl(&self) -> bool {
        self.check_ttl && !self.use_cache_only
    }
}
