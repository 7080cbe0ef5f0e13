//config
pub const CONFIG_ALREADY_INITIALIZED: &str = "Content config already initialized";
pub const CONFIG_NOT_INITIALIZED: &str = "Content config not initialized";

//gateway
pub const GATEWAY_CLIENT_BUILD_FAILED: &str = "Failed to build content gateway HTTP client";
pub const GATEWAY_UNHEALTHY: &str = "Content gateway health check failed";

//server
pub const SERVER_BIND_FAILED: &str = "Failed to bind HTTP listener";
pub const SERVER_FAILED: &str = "HTTP server error";
