//! Reusable configuration trees and `hapsync.toml` snippets.

/// Host is the local `host/` directory; the host check only verifies the
/// staged copy has a `configuration.yaml`; reload drops a marker next to
/// the host directory.
pub const LOCAL_HOST_CONFIG: &str = r#"[source]
root = "config"

[host]
destination = "local"
path = "host"

[host_check]
command = "test -f {path}/configuration.yaml"
timeout_secs = 10

[reload]
command = "touch ../reloaded"
health_command = "true"
retries = 1
backoff_secs = 0
"#;

pub const CONFIGURATION_YAML: &str = "homeassistant:
  name: Home
  time_zone: Europe/Berlin
automation: !include automations.yaml
script: !include scripts.yaml
";

pub const AUTOMATIONS_YAML: &str = "- alias: Porch light at sunset
  trigger:
    - platform: sun
      event: sunset
  action:
    - service: light.turn_on
      target:
        entity_id: light.porch
";

pub const SCRIPTS_YAML: &str = "goodnight:
  sequence:
    - service: light.turn_off
      target:
        entity_id: all
";

/// A small tree that passes validation
pub fn valid_tree() -> Vec<(&'static str, &'static str)> {
    vec![
        ("configuration.yaml", CONFIGURATION_YAML),
        ("automations.yaml", AUTOMATIONS_YAML),
        ("scripts.yaml", SCRIPTS_YAML),
    ]
}

/// `configuration.yaml` that includes a file the tree does not have
pub const BROKEN_INCLUDE_CONFIGURATION: &str = "homeassistant:
  name: Home
automation: !include automations.yaml
mqtt: !include mqtt.yaml
";

/// Default config with the host check replaced by `command`
pub fn config_with_host_check(command: &str) -> String {
    LOCAL_HOST_CONFIG.replace(
        "command = \"test -f {path}/configuration.yaml\"",
        &format!("command = \"{}\"", command),
    )
}

/// Host check prints a runtime-style error and exits non-zero
pub fn rejecting_host_check_config() -> String {
    config_with_host_check("echo 'Invalid config for [automation]' >&2; false")
}

/// Reload succeeds but the host never reports healthy
pub fn unhealthy_host_config() -> String {
    LOCAL_HOST_CONFIG.replace(
        "health_command = \"true\"",
        "health_command = \"echo 'connection refused' >&2; false\"",
    )
}
