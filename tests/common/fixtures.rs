//! Config files and provider responses shared by integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use rate_guardian::TestDir;
use wiremock::ResponseTemplate;

/// A config file written into its own temp directory.
pub struct ConfigFixture {
    pub dir: TestDir,
    pub path: PathBuf,
}

impl ConfigFixture {
    pub fn new(toml: &str) -> Self {
        let dir = TestDir::new();
        dir.create_file("config.toml", toml);
        let path = dir.file_path("config.toml");
        Self { dir, path }
    }
}

/// One openai target pointed at `base_url`, console channel only.
pub fn single_target_toml(base_url: &str, threshold: u32) -> String {
    format!(
        r#"[general]
timeout_seconds = 5

[[targets]]
name = "primary"
provider = "openai"
api_key = "sk-fixture"
threshold = {threshold}
check_interval = 60
base_url = "{base_url}"

[notifications.console]
enabled = true
"#
    )
}

/// A config whose only target uses a provider nobody registered.
pub fn unknown_provider_toml() -> String {
    r#"[[targets]]
name = "mystery"
provider = "acme"
api_key = "k"
"#
    .to_string()
}

/// A webhook-only config posting to `url`.
pub fn webhook_toml(base_url: &str, url: &str) -> String {
    format!(
        r#"[[targets]]
provider = "openai"
api_key = "sk-fixture"
base_url = "{base_url}"

[notifications.webhook]
enabled = true
url = "{url}"
"#
    )
}

/// 200 with OpenAI-style request counters.
pub fn request_headers(limit: u32, remaining: u32) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("x-ratelimit-limit-requests", limit.to_string().as_str())
        .insert_header("x-ratelimit-remaining-requests", remaining.to_string().as_str())
        .insert_header("x-ratelimit-reset-requests", "6s")
        .set_body_json(serde_json::json!({ "data": [] }))
}

/// 200 with generic `X-RateLimit-*` counters.
pub fn generic_headers(limit: u32, remaining: u32) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("X-RateLimit-Limit", limit.to_string().as_str())
        .insert_header("X-RateLimit-Remaining", remaining.to_string().as_str())
        .set_body_json(serde_json::json!({ "id": "msg" }))
}

/// GitHub `/rate_limit` body.
pub fn github_rate_limit(limit: u32, remaining: u32, reset: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "resources": {
            "core": { "limit": limit, "remaining": remaining, "reset": reset, "used": limit - remaining }
        },
        "rate": { "limit": limit, "remaining": remaining, "reset": reset }
    }))
}
