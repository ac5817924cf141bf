use crate::models::{AuthStatus, DashboardConfig};
use crate::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "/dashboard-default-config.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    /// Error for a non-2xx response. The server's `{ "message": ... }` wins
    /// over the generic status line.
    fn http(status: u16, payload: &Value) -> Self {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed ({status})"));
        let kind = if status == 401 {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::Http
        };
        Self { kind, message }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    /// `window.ENV.API_URL` (or `api_url`), else the page's own origin.
    pub fn new() -> Self {
        let Some(window) = web_sys::window() else {
            return Self {
                api_url: String::new(),
            };
        };

        if let Some(env) = window.get("ENV") {
            if !env.is_undefined() && env.is_object() {
                for key in ["API_URL", "api_url"] {
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self {
                                api_url: url_str.trim_end_matches('/').to_string(),
                            };
                        }
                    }
                }
            }
        }

        Self {
            api_url: window.location().origin().unwrap_or_default(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Clone, Debug)]
pub(crate) struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct ConfigEnvelope<'a> {
    config: &'a DashboardConfig,
}

/// Decode a response body the way the server writes it: JSON when it
/// parses, otherwise the raw text becomes the message.
pub(crate) fn payload_from_text(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({ "message": raw }))
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn from_env() -> Self {
        Self::new(EnvConfig::new().api_url)
    }

    async fn request_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<Value> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let req = client
            .request(method, url)
            .header("Accept", "application/json");
        #[cfg(target_arch = "wasm32")]
        let req = req.fetch_credentials_include();
        let req = match body {
            Some(b) => req.json(b),
            None => req,
        };

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();
        let raw = res.text().await.map_err(ApiError::network)?;
        let payload = payload_from_text(&raw);

        if status.is_success() {
            Ok(payload)
        } else {
            Err(ApiError::http(status.as_u16(), &payload))
        }
    }

    /// The stored config, or the bundled default when the API is unavailable.
    pub async fn load_config(&self) -> ApiResult<DashboardConfig> {
        match self
            .request_json(reqwest::Method::GET, "/api/config", None::<&()>)
            .await
        {
            Ok(payload) => Ok(normalize::config(&payload["config"])),
            Err(e) => {
                log::warn!("API config unavailable, falling back to default config file: {e}");
                self.load_default_config().await
            }
        }
    }

    pub async fn load_default_config(&self) -> ApiResult<DashboardConfig> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, DEFAULT_CONFIG_PATH);
        let res = client
            .get(url)
            .header("Cache-Control", "no-store")
            .send()
            .await
            .map_err(ApiError::network)?;
        if !res.status().is_success() {
            return Err(ApiError {
                kind: ApiErrorKind::Http,
                message: "Failed to load default dashboard config.".to_string(),
            });
        }
        let payload: Value = res.json().await.map_err(ApiError::parse)?;
        Ok(normalize::config(&payload))
    }

    /// Persist the whole config; the server's normalized copy comes back.
    pub async fn save_config(&self, config: &DashboardConfig) -> ApiResult<DashboardConfig> {
        let normalized = normalize::config(&serde_json::to_value(config).map_err(ApiError::parse)?);
        let payload = self
            .request_json(
                reqwest::Method::POST,
                "/api/config",
                Some(&ConfigEnvelope {
                    config: &normalized,
                }),
            )
            .await?;
        Ok(normalize::config(&payload["config"]))
    }

    pub async fn auth_status(&self) -> ApiResult<AuthStatus> {
        let payload = self
            .request_json(reqwest::Method::GET, "/api/auth/status", None::<&()>)
            .await?;
        serde_json::from_value(payload).map_err(ApiError::parse)
    }

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Value> {
        self.request_json(reqwest::Method::POST, "/api/login", Some(credentials))
            .await
    }

    pub async fn bootstrap_admin(&self, credentials: &Credentials) -> ApiResult<Value> {
        self.request_json(reqwest::Method::POST, "/api/auth/bootstrap", Some(credentials))
            .await
    }

    pub async fn logout(&self) -> ApiResult<Value> {
        self.request_json(
            reqwest::Method::POST,
            "/api/logout",
            Some(&serde_json::json!({})),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_error_prefers_server_message() {
        let err = ApiError::http(403, &json!({"message": "Invalid credentials."}));
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert_eq!(err.to_string(), "Invalid credentials.");
    }

    #[test]
    fn test_error_falls_back_to_status() {
        let err = ApiError::http(500, &json!({}));
        assert_eq!(err.to_string(), "Request failed (500)");
        assert_eq!(ApiError::http(401, &json!({})).kind, ApiErrorKind::Unauthorized);
    }

    #[test]
    fn test_payload_from_text() {
        assert_eq!(payload_from_text(""), json!({}));
        assert_eq!(payload_from_text(r#"{"ok":true}"#), json!({"ok": true}));
        assert_eq!(payload_from_text("Bad Gateway"), json!({"message": "Bad Gateway"}));
    }

    #[test]
    fn test_credentials_wire_shape() {
        let body = serde_json::to_value(Credentials {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        })
        .expect("serialize");
        assert_eq!(body, json!({"username": "admin", "password": "hunter2"}));
    }
}
