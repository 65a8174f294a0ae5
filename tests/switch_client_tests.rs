use anyhow::Result;

use switchkit::client::{
    command_path, split_mangled_name, CommandOutcome, ControlClient, LoginManager,
    SessionContext, CONTROLLER_HOST, CONTROLLER_PORT,
};

/// Login collaborator stub; hands out a canned session and checks that the
/// CLI credentials actually reach the seam.
struct StubLogin {
    expected_username: &'static str,
    expected_password: &'static str,
}

impl LoginManager for StubLogin {
    async fn authenticate(&self, username: &str, password: &str) -> Result<SessionContext> {
        assert_eq!(username, self.expected_username);
        assert_eq!(password, self.expected_password);
        Ok(SessionContext {
            cookie: "session=stub-token".to_string(),
        })
    }
}

#[tokio::test]
async fn test_connect_passes_credentials_to_login_manager() {
    let login = StubLogin {
        expected_username: "operator",
        expected_password: "hunter2",
    };

    let client = ControlClient::connect(
        CONTROLLER_HOST,
        CONTROLLER_PORT,
        &login,
        "operator",
        "hunter2",
    )
    .await
    .expect("Connect with stub login should succeed");

    assert_eq!(client.session().cookie, "session=stub-token");
}

#[tokio::test]
async fn test_failed_login_propagates() {
    struct FailingLogin;
    impl LoginManager for FailingLogin {
        async fn authenticate(&self, _username: &str, _password: &str) -> Result<SessionContext> {
            anyhow::bail!("invalid credentials")
        }
    }

    let result =
        ControlClient::connect(CONTROLLER_HOST, CONTROLLER_PORT, &FailingLogin, "a", "b").await;
    assert!(result.is_err());
}

#[test]
fn test_effective_names_for_mangled_switch() {
    // `-s foo;bar -d baz` must end up with directory=foo, switch=foo.
    let explicit_directory = Some("baz".to_string());
    let (dir_override, switch) = split_mangled_name("foo;bar");

    let directory = dir_override.or(explicit_directory);
    assert_eq!(directory.as_deref(), Some("foo"));
    assert_eq!(switch, "foo");
}

#[test]
fn test_command_path_for_effective_names() {
    let (dir_override, switch) = split_mangled_name("foo;bar");
    let directory = dir_override.expect("Mangled name should override the directory");
    assert_eq!(
        command_path(&directory, &switch),
        "/ws.v1/switch/foo/foo/command"
    );
}

#[test]
fn test_outcome_wire_contract() {
    assert!(CommandOutcome::from_body("0").is_success());
    assert_eq!(
        CommandOutcome::from_body("1"),
        CommandOutcome::Failure("1".to_string())
    );
    assert_eq!(
        CommandOutcome::from_body("{\"error\": \"no such switch\"}"),
        CommandOutcome::Failure("{\"error\": \"no such switch\"}".to_string())
    );
}
