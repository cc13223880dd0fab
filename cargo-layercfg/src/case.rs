//! Snake-case conversion for section and field tags.

use std::sync::LazyLock;

use regex::Regex;

#[expect(
    clippy::expect_used,
    reason = "patterns are literals covered by unit tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("case pattern is valid")
}

/// Any character followed by a capitalised word: `HTTPHost`, `2Config`.
static CAPITALISED_WORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(.)([A-Z][a-z]+)"));

/// A lowercase letter or digit followed by a capital: `clientId`.
static WORD_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| compile(r"([a-z0-9])([A-Z])"));

/// Converts an identifier to `snake_case`.
///
/// Acronyms stay together (`HTTPHost` becomes `http_host`). Existing
/// underscores are kept as written, so snake-cased input is returned
/// unchanged.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let split_words = CAPITALISED_WORD.replace_all(name, "${1}_${2}");
    WORD_BOUNDARY
        .replace_all(&split_words, "${1}_${2}")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    //! Unit tests for snake-case conversion.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("HttpServerConfig", "http_server_config")]
    #[case("HTTPHost", "http_host")]
    #[case("ClientID", "client_id")]
    #[case("DB", "db")]
    #[case("OIDCConfig", "oidc_config")]
    #[case("host", "host")]
    #[case("http_host", "http_host")]
    #[case("RabbitMqConfig", "rabbit_mq_config")]
    #[case("Postgres2Config", "postgres2_config")]
    #[case("foo__bar", "foo__bar")]
    #[case("_private", "_private")]
    #[case("trailing_", "trailing_")]
    fn converts_to_snake_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_snake_case(input), expected);
    }

    #[rstest]
    #[case("HTTPHost")]
    #[case("OIDCConfig")]
    #[case("already_snake")]
    fn conversion_is_idempotent(#[case] input: &str) {
        let once = to_snake_case(input);
        assert_eq!(to_snake_case(&once), once);
    }
}
