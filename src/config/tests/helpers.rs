//! Shared test helpers for configuration tests.

use std::ffi::OsString;

use ortho_config::{MergeComposer, OrthoConfig};
use serde_json::Value;

use crate::AtlantisGateConfig;

/// Applies a configuration layer to the composer based on the layer type.
pub fn apply_layer(composer: &mut MergeComposer, layer_type: &str, value: Value) {
    match layer_type {
        "defaults" => composer.push_defaults(value),
        "file" => composer.push_file(value, None),
        "environment" => composer.push_environment(value),
        "cli" => composer.push_cli(value),
        _ => panic!("unknown layer type: {layer_type}"),
    }
}

/// Helper to compose an [`AtlantisGateConfig`] from a sequence of
/// `(layer_type, value)` pairs.
pub fn build_config_from_layers(layers: &[(&str, Value)]) -> AtlantisGateConfig {
    let mut composer = MergeComposer::new();

    for (layer_type, value) in layers {
        apply_layer(&mut composer, layer_type, value.clone());
    }

    AtlantisGateConfig::merge_from_layers(composer.layers()).expect("merge should succeed")
}

/// Loads configuration from `cli_args` with `env` applied and no
/// configuration file in reach.
pub fn load_with(env: &[(&str, Option<&str>)], cli_args: &[&str]) -> AtlantisGateConfig {
    let temp_dir = tempfile::TempDir::new().expect("temp dir should be created");
    let home = temp_dir.path().to_string_lossy().to_string();

    let mut variables: Vec<(&str, Option<&str>)> = vec![
        ("HOME", Some(home.as_str())),
        ("XDG_CONFIG_HOME", Some(home.as_str())),
    ];
    variables.extend_from_slice(env);
    let _guard = env_lock::lock_env(variables);

    let mut args: Vec<OsString> = vec![OsString::from("atlantis-gate")];
    args.extend(cli_args.iter().map(OsString::from));

    AtlantisGateConfig::load_from_iter(args).expect("config should load")
}
