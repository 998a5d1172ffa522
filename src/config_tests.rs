//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.telegram.poll_timeout_secs, 30);
        assert!(config.odds_api.api_key.is_none());
        assert_eq!(config.odds_api.base_url, "https://api.the-odds-api.com/v4");
        assert_eq!(config.odds_api.regions, "eu,us");
        assert_eq!(config.odds_api.markets, "h2h");
        assert_eq!(config.odds_api.odds_format, "decimal");
        assert!(config.odds_api.sports.is_empty());
        assert_eq!(config.cache.timeout_secs, 300);
        assert_eq!(config.users.file, "known_users.json");
    }

    #[test]
    fn test_analyzer_config_default() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.min_odds, dec!(1.5));
        assert_eq!(config.max_odds, dec!(5.0));
        assert_eq!(config.min_confidence, 50);
        assert_eq!(config.combo_size, 3);
        assert_eq!(config.days_ahead, 3);
    }

    #[test]
    fn test_analyzer_config_partial() {
        let toml_str = r#"
min_odds = 1.8
days_ahead = 2
"#;
        let config: AnalyzerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.min_odds, dec!(1.8));
        assert_eq!(config.max_odds, dec!(5.0));
        assert_eq!(config.days_ahead, 2);
        assert_eq!(config.combo_size, 3);
    }

    #[test]
    fn test_odds_api_config() {
        let toml_str = r#"
api_key = "abc123"
regions = "eu"
sports = ["soccer_epl", "soccer_france_ligue_one"]
"#;
        let config: OddsApiConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.regions, "eu");
        assert_eq!(config.markets, "h2h");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.sports.len(), 2);
    }

    #[test]
    fn test_full_config_sections() {
        let toml_str = r#"
[telegram]
bot_token = "123:abc"

[analyzer]
min_confidence = 55

[cache]
timeout_secs = 60

[users]
file = "data/users.json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.telegram.poll_timeout_secs, 30);
        assert_eq!(config.analyzer.min_confidence, 55);
        assert_eq!(config.cache.timeout_secs, 60);
        assert_eq!(config.users_file().to_str(), Some("data/users.json"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config: Config = toml::from_str(
            r#"
[telegram]
bot_token = "from-file"

[odds_api]
api_key = "file-key"
"#,
        )
        .unwrap();

        config.apply_overrides(Some("from-env".to_string()), Some("env-key".to_string()));
        assert_eq!(config.telegram.bot_token, "from-env");
        assert_eq!(config.odds_api.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let mut config = Config::default();
        config.odds_api.api_key = Some("  ".to_string());

        config.apply_overrides(Some(" ".to_string()), None);
        assert!(config.telegram.bot_token.is_empty());
        assert!(config.odds_api.api_key.is_none());
        assert!(config.demo_mode(false));
    }

    #[test]
    fn test_require_bot_token() {
        let mut config = Config::default();
        assert!(config.require_bot_token().is_err());

        config.apply_overrides(Some("123:abc".to_string()), None);
        assert_eq!(config.require_bot_token().unwrap(), "123:abc");
    }

    #[test]
    fn test_demo_mode() {
        let mut config = Config::default();
        assert!(config.demo_mode(false));

        config.odds_api.api_key = Some("key".to_string());
        assert!(!config.demo_mode(false));
        assert!(config.demo_mode(true));
    }

    #[test]
    fn test_users_file_tilde_expansion() {
        let mut config = Config::default();
        config.users.file = "~/betiq/known_users.json".to_string();
        let path = config.users_file();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("betiq/known_users.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[analyzer]
combo_size = 4
max_odds = 6.5

[cache]
timeout_secs = 120
"#
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.analyzer.combo_size, 4);
        assert_eq!(config.analyzer.max_odds, dec!(6.5));
        assert_eq!(config.cache.timeout_secs, 120);
        assert_eq!(config.analyzer.min_confidence, 50);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.cache.timeout_secs, 300);
        assert_eq!(config.analyzer.days_ahead, 3);
    }
}
