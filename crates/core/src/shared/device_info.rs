use serde::Serialize;

/// Capture-device description attached to the session payload metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub platform: String,
    pub app_version: String,
}

impl DeviceInfo {
    pub fn current() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
