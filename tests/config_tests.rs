// Config loading and validation tests

use service_index::config::{AppConfig, DiscoveryConfig};
use service_index::discovery::{
    DEFAULT_CLUSTER_DOMAIN, DEFAULT_KUBERNETES_SELECTOR, DEFAULT_LABEL_SELECTOR, TraefikMode,
};
use std::time::Duration;

const VALID_CONFIG: &str = r#"
[server]
port = 8080
host = "0.0.0.0"

[aggregator]
timeout_ms = 1500

[discovery]
backend = "traefik"
url = "http://traefik:8080"
mode = "v2-path-prefix"
timeout_ms = 2000
"#;

const MINIMAL_FILE_CONFIG: &str = r#"
[server]
port = 8080
host = "127.0.0.1"

[discovery]
backend = "file"
path = "services.json"
"#;

const MINIMAL_DOCKER_CONFIG: &str = r#"
[server]
port = 8080
host = "127.0.0.1"

[discovery]
backend = "docker"
"#;

const MINIMAL_KUBERNETES_CONFIG: &str = r#"
[server]
port = 8080
host = "0.0.0.0"

[discovery]
backend = "kubernetes"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.aggregator.timeout(), Duration::from_millis(1500));
    match config.discovery {
        DiscoveryConfig::Traefik {
            url,
            mode,
            timeout_ms,
        } => {
            assert_eq!(url, "http://traefik:8080");
            assert_eq!(mode, TraefikMode::V2PathPrefix);
            assert_eq!(timeout_ms, 2000);
        }
        other => panic!("expected traefik backend, got {other:?}"),
    }
}

#[test]
fn test_config_file_backend_with_defaults() {
    let config = AppConfig::load_from_str(MINIMAL_FILE_CONFIG).expect("valid");
    assert_eq!(config.aggregator.timeout_ms, 3000);
    match config.discovery {
        DiscoveryConfig::File { path } => assert_eq!(path, "services.json"),
        other => panic!("expected file backend, got {other:?}"),
    }
}

#[test]
fn test_config_docker_backend_defaults() {
    let config = AppConfig::load_from_str(MINIMAL_DOCKER_CONFIG).expect("valid");
    match config.discovery {
        DiscoveryConfig::Docker {
            label_selector,
            timeout_ms,
        } => {
            assert_eq!(label_selector, DEFAULT_LABEL_SELECTOR);
            assert_eq!(timeout_ms, 3000);
        }
        other => panic!("expected docker backend, got {other:?}"),
    }
}

#[test]
fn test_config_kubernetes_backend_defaults() {
    let config = AppConfig::load_from_str(MINIMAL_KUBERNETES_CONFIG).expect("valid");
    match config.discovery {
        DiscoveryConfig::Kubernetes {
            label_selector,
            namespace,
            cluster_domain,
            timeout_ms,
        } => {
            assert_eq!(label_selector, DEFAULT_KUBERNETES_SELECTOR);
            assert_eq!(namespace, None);
            assert_eq!(cluster_domain, DEFAULT_CLUSTER_DOMAIN);
            assert_eq!(timeout_ms, 3000);
        }
        other => panic!("expected kubernetes backend, got {other:?}"),
    }
}

#[test]
fn test_config_kubernetes_backend_overrides() {
    let cfg = format!(
        "{MINIMAL_KUBERNETES_CONFIG}label_selector = \"team=qa\"\nnamespace = \"rp\"\ncluster_domain = \"k8s.example.org\"\n"
    );
    let config = AppConfig::load_from_str(&cfg).expect("valid");
    match config.discovery {
        DiscoveryConfig::Kubernetes {
            label_selector,
            namespace,
            cluster_domain,
            ..
        } => {
            assert_eq!(label_selector, "team=qa");
            assert_eq!(namespace.as_deref(), Some("rp"));
            assert_eq!(cluster_domain, "k8s.example.org");
        }
        other => panic!("expected kubernetes backend, got {other:?}"),
    }
}

#[test]
fn test_config_validation_rejects_blank_namespace() {
    let bad = format!("{MINIMAL_KUBERNETES_CONFIG}namespace = \" \"\n");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("discovery.namespace"));
}

#[test]
fn test_config_validation_rejects_empty_cluster_domain() {
    let bad = format!("{MINIMAL_KUBERNETES_CONFIG}cluster_domain = \"\"\n");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("discovery.cluster_domain"));
}

#[test]
fn test_config_traefik_mode_defaults_to_v2() {
    let cfg = VALID_CONFIG.replace("mode = \"v2-path-prefix\"\n", "");
    let config = AppConfig::load_from_str(&cfg).expect("valid");
    match config.discovery {
        DiscoveryConfig::Traefik { mode, .. } => assert_eq!(mode, TraefikMode::V2),
        other => panic!("expected traefik backend, got {other:?}"),
    }
}

#[test]
fn test_config_traefik_v1_modes_parse() {
    for (raw, expected) in [
        ("v1-docker", TraefikMode::V1Docker),
        ("v1-file", TraefikMode::V1File),
        ("v2", TraefikMode::V2),
    ] {
        let cfg = VALID_CONFIG.replace("v2-path-prefix", raw);
        let config = AppConfig::load_from_str(&cfg).expect("valid");
        match config.discovery {
            DiscoveryConfig::Traefik { mode, .. } => assert_eq!(mode, expected),
            other => panic!("expected traefik backend, got {other:?}"),
        }
    }
}

#[test]
fn test_config_rejects_unknown_traefik_mode() {
    let bad = VALID_CONFIG.replace("v2-path-prefix", "v3");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

#[test]
fn test_config_rejects_unknown_backend() {
    let bad = MINIMAL_DOCKER_CONFIG.replace("\"docker\"", "\"consul\"");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8080", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_host() {
    let bad = VALID_CONFIG.replace("host = \"0.0.0.0\"", "host = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.host"));
}

#[test]
fn test_config_validation_rejects_aggregator_timeout_zero() {
    let bad = VALID_CONFIG.replace("timeout_ms = 1500", "timeout_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("aggregator.timeout_ms"));
}

#[test]
fn test_config_validation_rejects_discovery_timeout_zero() {
    let bad = VALID_CONFIG.replace("timeout_ms = 2000", "timeout_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("discovery.timeout_ms"));
}

#[test]
fn test_config_validation_rejects_empty_traefik_url() {
    let bad = VALID_CONFIG.replace("url = \"http://traefik:8080\"", "url = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("discovery.url"));
}

#[test]
fn test_config_validation_rejects_non_http_traefik_url() {
    let bad = VALID_CONFIG.replace("http://traefik:8080", "traefik:8080");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("discovery.url"));
}

#[test]
fn test_config_validation_rejects_empty_services_path() {
    let bad = MINIMAL_FILE_CONFIG.replace("path = \"services.json\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("discovery.path"));
}

#[test]
fn test_config_validation_rejects_empty_label_selector() {
    let bad = format!("{MINIMAL_DOCKER_CONFIG}label_selector = \"\"\n");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("discovery.label_selector"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.aggregator.timeout_ms, 1500);
}
