use minenav_core::platform::Platform;

/// Why a registry request failed. Search adapters turn these into failed
/// pages; detail fetches hand them to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("{platform} answered with HTTP {status}")]
    Http { platform: Platform, status: u16 },

    #[error("{platform} did not answer in time")]
    Timeout { platform: Platform },

    #[error("Unexpected {platform} response: {message}")]
    Decode { platform: Platform, message: String },

    #[error("Could not reach {platform}: {message}")]
    Transport { platform: Platform, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Classify a `reqwest` failure.
    pub fn from_reqwest(platform: Platform, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout { platform }
        } else if err.is_decode() {
            Error::Decode {
                platform,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Error::Http {
                platform,
                status: status.as_u16(),
            }
        } else {
            Error::Transport {
                platform,
                message: err.to_string(),
            }
        }
    }
}
