//! Checks that the generated settings compile and carry the build script's
//! defaults.

use layercfg::Embedded;
use layercfg_fixture::settings::Config;
use rstest::rstest;

#[rstest]
fn defaults_come_from_build_script() {
    let config = Config::default();
    assert_eq!(config.http_server_config.host, "0.0.0.0");
    assert_eq!(config.http_server_config.port, "8080");
    assert_eq!(config.redis_config.db, 1);
    assert_eq!(config.redis_config.user, "");
    assert_eq!(config.oidc_config.issuer, "https://id.example.com");
    assert!(config.oidc_config.scopes.is_empty());
    assert_eq!(config.embedding().env_prefix(), None);
}

#[rstest]
fn echoes_sections_under_snake_case_keys() {
    let mut out = Vec::new();
    Config::default()
        .echo(&mut out, layercfg::Format::Json)
        .expect("echo json");
    let text = String::from_utf8(out).expect("utf-8 output");
    assert!(text.contains("\"http_server_config\""));
    assert!(text.contains("\"client_id\""));
    assert!(!text.contains("embedding"));
}
