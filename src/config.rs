/*
 * Config Module
 *
 * Loads SimulationParams from a TOML file. The file may set any subset of
 * the parameters; whatever it sets is layered over the scenario preset
 * (chosen on the command line, by the file's `scenario` key, or the default).
 */

use std::path::Path;
use toml::Value;

use crate::error::{SwarmError, SwarmResult};
use crate::params::{Scenario, SimulationParams};

/// Load parameters, layering an optional config file over a scenario preset.
pub fn load_params(path: Option<&Path>, scenario: Option<Scenario>) -> SwarmResult<SimulationParams> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| SwarmError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
            parse_params(&content, path, scenario)
        }
        None => {
            let params = SimulationParams::for_scenario(scenario.unwrap_or_default());
            params.validate()?;
            Ok(params)
        }
    }
}

/// Parse config text; `origin` is only used in error messages.
pub fn parse_params(content: &str, origin: &Path, scenario: Option<Scenario>) -> SwarmResult<SimulationParams> {
    let parse_error = |source: toml::de::Error| SwarmError::ConfigParse {
        path: origin.to_path_buf(),
        source,
    };

    let overlay: toml::Table = toml::from_str(content).map_err(parse_error)?;

    // The command line wins over the file's own scenario key
    let scenario = match (scenario, overlay.get("scenario")) {
        (Some(scenario), _) => scenario,
        (None, Some(value)) => value.clone().try_into().map_err(parse_error)?,
        (None, None) => Scenario::default(),
    };

    let mut merged = Value::try_from(SimulationParams::for_scenario(scenario))?;
    merge(&mut merged, Value::Table(overlay));

    let mut params: SimulationParams = merged.try_into().map_err(parse_error)?;
    params.scenario = scenario;
    params.validate()?;
    Ok(params)
}

/// Render parameters as TOML, e.g. for `--print-config`.
pub fn to_toml(params: &SimulationParams) -> SwarmResult<String> {
    Ok(toml::to_string_pretty(params)?)
}

// Recursively overlay tables; any non-table value replaces the base outright
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base), Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::EdgeMode;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("test.toml")
    }

    #[test]
    fn partial_file_layers_over_preset() {
        let params = parse_params(
            r#"
                scenario = "target"
                num_agents = 12

                [flocking]
                cohesion_weight = 2.0
            "#,
            &origin(),
            None,
        )
        .unwrap();

        assert_eq!(params.scenario, Scenario::Target);
        assert_eq!(params.num_agents, 12);
        assert_eq!(params.flocking.cohesion_weight, 2.0);
        // Untouched values come from the target preset
        assert_eq!(params.edge_mode, EdgeMode::Wrap);
        assert_eq!(params.flocking.neighbor_radius, 80.0);
    }

    #[test]
    fn cli_scenario_overrides_file() {
        let params = parse_params("scenario = \"target\"", &origin(), Some(Scenario::Flocking)).unwrap();
        assert_eq!(params.scenario, Scenario::Flocking);
        assert_eq!(params.edge_mode, EdgeMode::Bounce);
    }

    #[test]
    fn empty_file_gives_default_preset() {
        let params = parse_params("", &origin(), None).unwrap();
        assert_eq!(params.scenario, Scenario::Colony);
        assert!(params.pheromone.enabled);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = parse_params("[pheromone]\ndiffusion_rate = 2.0", &origin(), None).unwrap_err();
        assert!(matches!(err, SwarmError::InvalidParam { field: "pheromone.diffusion_rate", .. }));

        let err = parse_params("scenario = \"volleyball\"", &origin(), None).unwrap_err();
        assert!(matches!(err, SwarmError::ConfigParse { .. }));

        let err = parse_params("num_agents = \"many\"", &origin(), None).unwrap_err();
        assert!(matches!(err, SwarmError::ConfigParse { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_params(Some(Path::new("/nonexistent/swarm.toml")), None).unwrap_err();
        match err {
            SwarmError::ConfigRead { path, .. } => assert_eq!(path, PathBuf::from("/nonexistent/swarm.toml")),
            other => panic!("expected ConfigRead, got {:?}", other),
        }
    }

    #[test]
    fn printed_config_loads_back() {
        let mut params = SimulationParams::for_scenario(Scenario::Soccer);
        params.seed = Some(42);
        params.max_speed = 6.5;

        let text = to_toml(&params).unwrap();
        let loaded = parse_params(&text, &origin(), None).unwrap();
        assert_eq!(loaded.scenario, Scenario::Soccer);
        assert_eq!(loaded.seed, Some(42));
        assert_eq!(loaded.max_speed, 6.5);
        assert_eq!(loaded.objects, params.objects);
    }

    #[test]
    fn bundled_colony_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/colony.toml");
        let params = load_params(Some(&path), None).unwrap();
        assert_eq!(params.scenario, Scenario::Colony);
        assert!(params.colony.enabled);
    }
}
