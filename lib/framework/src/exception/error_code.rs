pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
pub const CONFLICT: &str = "CONFLICT";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const REMOTE_SERVICE_ERROR: &str = "REMOTE_SERVICE_ERROR";
