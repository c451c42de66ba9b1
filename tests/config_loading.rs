//! Integration tests for config loading across all file formats.

use splitproxy::config::model::Config;
use splitproxy::config::sources::parse_config_str;
use splitproxy::config::validation::validate;
use splitproxy::intercept::Interceptor;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("splitproxy.yaml");
    let config = parse_config_str("yaml", &content, "splitproxy.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn yaml_full_example_loads_and_validates() {
    let content = load_example("full.yaml");
    let config = parse_config_str("yaml", &content, "full.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.ui_routes.len(), 5);
    assert_eq!(config.security_headers.len(), 4);
}

#[test]
fn custom_example_builds_an_interceptor() {
    let content = load_example("local-3000.yaml");
    let config = parse_config_str("yaml", &content, "local-3000.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.local.port, 3000);

    let interceptor = Interceptor::from_config(&config).unwrap();
    assert_eq!(interceptor.router().production_domain(), "ndx.example.gov");
    assert_eq!(interceptor.router().routes().patterns().len(), 3);
}

#[cfg(feature = "json")]
#[test]
fn json_example_loads_and_validates() {
    let content = load_example("splitproxy.json");
    let config = parse_config_str("json", &content, "splitproxy.json").unwrap();
    validate(&config).unwrap();
}

#[cfg(feature = "toml")]
#[test]
fn toml_example_loads_and_validates() {
    let content = load_example("splitproxy.toml");
    let config = parse_config_str("toml", &content, "splitproxy.toml").unwrap();
    validate(&config).unwrap();
}

#[cfg(all(feature = "json", feature = "toml"))]
#[test]
fn all_formats_produce_equivalent_configs() {
    let yaml = parse_config_str("yaml", &load_example("full.yaml"), "yaml").unwrap();
    let json = parse_config_str("json", &load_example("splitproxy.json"), "json").unwrap();
    let toml = parse_config_str("toml", &load_example("splitproxy.toml"), "toml").unwrap();

    assert_eq!(yaml, json);
    assert_eq!(yaml, toml);
}

#[test]
fn unsupported_format_returns_error() {
    let result = parse_config_str("xml", "{}", "test.xml");
    assert!(result.is_err());
}

#[test]
fn empty_route_table_fails_validation() {
    let config: Config = serde_json::from_str(r#"{"ui_routes": []}"#).unwrap();
    assert!(validate(&config).is_err());
}

#[test]
fn unknown_scheme_fails_to_parse() {
    let result = parse_config_str("yaml", "local:\n  scheme: ftp\n", "bad.yaml");
    assert!(result.is_err());
}
