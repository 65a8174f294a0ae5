use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::{debug, info};

/// Fixed local control-plane endpoint; the service only listens on localhost.
pub const CONTROLLER_HOST: &str = "127.0.0.1";
pub const CONTROLLER_PORT: u16 = 443;

/// Separator used by mangled switch names.
pub const MANGLE_SEPARATOR: char = ';';

/// Body the control service returns for a successful command.
const SUCCESS_BODY: &str = "0";

// Percent-encode everything except alphanumerics, `_`, `.`, `-`, and the
// path separator itself.
const COMMAND_PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'/');

/// One administrative command bound for a named switch.
/// Built once per invocation, consumed by a single PUT, then discarded.
#[derive(Debug, Clone)]
pub struct SwitchCommandRequest {
    pub directory: String,
    pub switch: String,
    pub command: String,
    pub args: Vec<String>,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Serialize)]
struct CommandPayload<'a> {
    command: &'a str,
    args: &'a [String],
}

/// Outcome of a remote command, decoded from the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// Any body other than the success marker, reported verbatim
    Failure(String),
}

impl CommandOutcome {
    pub fn from_body(body: &str) -> Self {
        if body == SUCCESS_BODY {
            CommandOutcome::Success
        } else {
            CommandOutcome::Failure(body.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }
}

/// Splits a possibly-mangled switch name into a directory override and the
/// effective switch name.
///
/// A mangled name is `switch;directory`. The original tool assigned the
/// FIRST segment to both values, silently overriding any explicit directory;
/// that precedence is reproduced for compatibility (see DESIGN.md).
pub fn split_mangled_name(raw: &str) -> (Option<String>, String) {
    match raw.split_once(MANGLE_SEPARATOR) {
        Some((first, _rest)) => (Some(first.to_string()), first.to_string()),
        None => (None, raw.to_string()),
    }
}

/// Percent-encoded request path for a switch command.
pub fn command_path(directory: &str, switch: &str) -> String {
    let raw = format!("/ws.v1/switch/{directory}/{switch}/command");
    utf8_percent_encode(&raw, COMMAND_PATH_SET).to_string()
}

/// Authenticated session handle returned by a login collaborator.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Cookie header value sent with every authenticated request
    pub cookie: String,
}

/// Login collaborator. The web-service login protocol lives behind this
/// seam; the client only needs something that turns credentials into a
/// session.
pub trait LoginManager {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<SessionContext>> + Send;
}

/// Login manager that performs one credential POST and keeps the returned
/// session cookie for the lifetime of the invocation.
#[derive(Debug)]
pub struct PersistentLogin {
    http: reqwest::Client,
    base_url: String,
}

impl PersistentLogin {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        // The controller serves HTTPS on localhost with a self-signed
        // certificate, so verification has to be disabled.
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .context("Failed to build HTTP client for login")?;

        Ok(Self {
            http,
            base_url: format!("https://{host}:{port}"),
        })
    }
}

impl LoginManager for PersistentLogin {
    async fn authenticate(&self, username: &str, password: &str) -> Result<SessionContext> {
        let url = format!("{}/ws.v1/login", self.base_url);
        debug!("Authenticating against {}", url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .context("Login request failed")?;

        let cookie = response
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).to_string())
            .ok_or_else(|| anyhow::anyhow!("Login response carried no session cookie"))?;

        info!("Authenticated as {}", username);
        Ok(SessionContext { cookie })
    }
}

/// Authenticated client for the switch control service.
pub struct ControlClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ControlClient {
    /// Authenticates with the given login manager and returns a client bound
    /// to the resulting session.
    pub async fn connect<L: LoginManager>(
        host: &str,
        port: u16,
        login: &L,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let session = login.authenticate(username, password).await?;

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: format!("https://{host}:{port}"),
            session,
        })
    }

    /// Session the client was bound to at connect time.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Issues a PUT with a JSON body and returns the raw response body.
    pub async fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let response = self
            .http
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::COOKIE, self.session.cookie.as_str())
            .json(body)
            .send()
            .await
            .with_context(|| format!("PUT {url} failed"))?;

        response.text().await.context("Failed to read response body")
    }

    /// Sends one switch command and decodes the outcome from the body.
    pub async fn send_switch_command(
        &self,
        request: &SwitchCommandRequest,
    ) -> Result<CommandOutcome> {
        let path = command_path(&request.directory, &request.switch);
        info!(
            command = %request.command,
            switch = %request.switch,
            "Issuing switch command via {}", path
        );

        let payload = CommandPayload {
            command: &request.command,
            args: &request.args,
        };
        let body = self.put_json(&path, &payload).await?;

        Ok(CommandOutcome::from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_switch_name_passes_through() {
        let (dir, switch) = split_mangled_name("foo");
        assert_eq!(dir, None);
        assert_eq!(switch, "foo");
    }

    #[test]
    fn test_mangled_name_overrides_directory_with_switch_segment() {
        // Preserved quirk: both values come from the first segment.
        let (dir, switch) = split_mangled_name("foo;bar");
        assert_eq!(dir, Some("foo".to_string()));
        assert_eq!(switch, "foo");
    }

    #[test]
    fn test_mangled_name_with_empty_rest() {
        let (dir, switch) = split_mangled_name("foo;");
        assert_eq!(dir, Some("foo".to_string()));
        assert_eq!(switch, "foo");
    }

    #[test]
    fn test_command_path_plain() {
        assert_eq!(
            command_path("Built-in", "sw0"),
            "/ws.v1/switch/Built-in/sw0/command"
        );
    }

    #[test]
    fn test_command_path_encodes_spaces_and_keeps_slashes() {
        let path = command_path("My Dir", "sw 1");
        assert_eq!(path, "/ws.v1/switch/My%20Dir/sw%201/command");
    }

    #[test]
    fn test_command_path_encodes_reserved_characters() {
        let path = command_path("d", "a;b");
        assert_eq!(path, "/ws.v1/switch/d/a%3Bb/command");
    }

    #[test]
    fn test_outcome_success_body() {
        assert_eq!(CommandOutcome::from_body("0"), CommandOutcome::Success);
        assert!(CommandOutcome::from_body("0").is_success());
    }

    #[test]
    fn test_outcome_failure_body_kept_verbatim() {
        let outcome = CommandOutcome::from_body("1");
        assert_eq!(outcome, CommandOutcome::Failure("1".to_string()));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_outcome_whitespace_is_not_success() {
        // The wire contract is the exact body "0".
        assert!(!CommandOutcome::from_body("0\n").is_success());
        assert!(!CommandOutcome::from_body(" 0").is_success());
    }

    #[test]
    fn test_payload_serialization() {
        let args = vec!["port1".to_string(), "up".to_string()];
        let payload = CommandPayload {
            command: "restart",
            args: &args,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"command":"restart","args":["port1","up"]}"#);
    }
}
