//! Ready-to-paste command for smoke-testing the proxy.

use serde_json::json;

pub const DEFAULT_TEST_MODEL: &str = "gemini-2.5-flash";

/// Render a `curl` call to the proxy's chat completions endpoint.
pub fn build_test_command(base_url: &str, api_key: &str, model: &str) -> String {
    let endpoint = format!("{}/v1/chat/completions", base_url.trim().trim_end_matches('/'));
    let body = json!({
        "model": model,
        "messages": [{"role": "user", "content": "Hello"}]
    });
    // Single quotes inside the body are escaped for the shell.
    let body = body.to_string().replace('\'', r"'\''");

    format!(
        "curl {endpoint} \\\n  -H \"Content-Type: application/json\" \\\n  -H \"Authorization: Bearer {api_key}\" \\\n  -d '{body}'"
    )
}
