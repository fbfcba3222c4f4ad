//! `list` command: personas grouped by category.

use std::error::Error;
use std::io::{self, Write};

use crate::core::builtin_personas::load_builtin_personas;
use crate::core::config::{path_display, Config};
use crate::core::persona::PersonaStore;
use crate::core::storage::{JsonFileStore, StateStore};

/// Print every persona in the configured data directory. Builtins are shown
/// when nothing has been saved yet; listing never writes state.
pub fn list_personas(config: &Config) -> Result<(), Box<dyn Error>> {
    let store = JsonFileStore::new(config.data_dir());
    let personas = store.load_personas()?.unwrap_or_else(load_builtin_personas);
    let personas = PersonaStore::new(personas);

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Personas in {}:", path_display(store.dir()))?;
    write_persona_list(&mut stdout, &personas)?;
    Ok(())
}

pub fn write_persona_list(out: &mut impl Write, personas: &PersonaStore) -> io::Result<()> {
    if personas.is_empty() {
        writeln!(out, "  (none)")?;
        return Ok(());
    }
    for (category, members) in personas.grouped_by_category() {
        writeln!(out)?;
        writeln!(out, "{category}")?;
        for persona in members {
            let marker = if persona.is_default { "" } else { " (custom)" };
            writeln!(
                out,
                "  {:<10} {}{} - {}",
                persona.id, persona.name, marker, persona.description
            )?;
        }
    }
    Ok(())
}
