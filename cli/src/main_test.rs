use clap::Parser;

use super::*;

#[test]
fn parses_login_with_password_flag() {
    let cli = Cli::try_parse_from(["sms-cli", "login", "--email", "admin@sms.dev", "--password", "pw"]).unwrap();
    assert!(matches!(cli.command, Command::Login { ref email, .. } if email == "admin@sms.dev"));
}

#[test]
fn register_role_must_be_exact() {
    let base = ["sms-cli", "register", "--full-name", "Ada", "--email", "a@sms.dev", "--password", "pw", "--role"];
    let ok = Cli::try_parse_from(base.iter().copied().chain(["TEACHER"])).unwrap();
    assert!(matches!(ok.command, Command::Register { role: Role::Teacher, .. }));
    assert!(Cli::try_parse_from(base.iter().copied().chain(["teacher"])).is_err());
}

#[test]
fn base_url_flag_overrides_environment() {
    let config = client_config(Some("https://api.school.test/"));
    assert_eq!(config.endpoint("/api/students"), "https://api.school.test/api/students");
}

#[test]
fn default_store_lives_under_sms() {
    if let Some(path) = default_store_path() {
        assert!(path.ends_with("sms/session.json"));
    }
}

#[test]
fn route_without_session_redirects_to_login() {
    let table = app_routes().unwrap();
    let text = describe_navigation(&table.navigate(None, "/students"));
    assert_eq!(text, "redirect /login?from=%2Fstudents");
}

#[test]
fn route_for_allowed_role_renders() {
    let table = app_routes().unwrap();
    let user = Session::new("abc", Role::Student);
    assert_eq!(describe_navigation(&table.navigate(Some(&user), "/marks")), "render Marks");
    assert_eq!(describe_navigation(&table.navigate(Some(&user), "/teachers")), "redirect /dashboard");
}

#[test]
fn open_session_uses_given_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let session = open_session(Some("http://127.0.0.1:9"), Some(path.clone())).unwrap();
    assert_eq!(session.store().path(), path.as_path());
    assert_eq!(session.restore(), None);
}
