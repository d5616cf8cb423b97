#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub upstream_base_url: String,
    pub upstream_token: String,
    pub upstream_timeout_secs: u64,
    pub requests_per_second: u32,
    pub global_concurrency: usize,
    pub day_concurrency: usize,
    pub max_attempts: u32,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_token", &"[redacted]")
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("requests_per_second", &self.requests_per_second)
            .field("global_concurrency", &self.global_concurrency)
            .field("day_concurrency", &self.day_concurrency)
            .field("max_attempts", &self.max_attempts)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
