use crate::core::persona::Persona;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BuiltinPersonaConfig {
    personas: Vec<Persona>,
}

pub fn load_builtin_personas() -> Vec<Persona> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/personas.toml");
    let config: BuiltinPersonaConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/personas.toml");
    config.personas
}
