#[derive(Clone)]
pub struct AppConfig {
    pub default_ttl: u32,
}

impl AppConfig {
    /// TTL applied to records whose request omitted one.
    pub fn effective_ttl(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_ttl)
    }
}
