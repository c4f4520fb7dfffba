/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PHARMFLOW_CONFIG";
/// Estimation tool used by modelfit when none is requested or configured.
pub const DEFAULT_ESTIMATION_TOOL: &str = "nonmem";
/// Concurrency used when the platform cannot report its parallelism.
pub const FALLBACK_CONCURRENCY: usize = 4;
