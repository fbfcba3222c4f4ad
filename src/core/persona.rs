use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::ids::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PersonaCategory {
    Productivity,
    Wellness,
    Learning,
    Entertainment,
    #[default]
    Custom,
}

impl PersonaCategory {
    pub const ALL: [PersonaCategory; 5] = [
        PersonaCategory::Productivity,
        PersonaCategory::Wellness,
        PersonaCategory::Learning,
        PersonaCategory::Entertainment,
        PersonaCategory::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PersonaCategory::Productivity => "Productivity",
            PersonaCategory::Wellness => "Wellness",
            PersonaCategory::Learning => "Learning",
            PersonaCategory::Entertainment => "Entertainment",
            PersonaCategory::Custom => "Custom",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for PersonaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, categorized behavioral profile the backend roleplays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: PersonaCategory,
    pub system_instruction: String,
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

/// Everything needed to create a persona except its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaDraft {
    pub name: String,
    pub description: String,
    pub category: PersonaCategory,
    pub system_instruction: String,
    pub avatar_url: String,
}

impl PersonaDraft {
    fn into_persona(self, id: String) -> Persona {
        Persona {
            id,
            name: self.name,
            description: self.description,
            category: self.category,
            system_instruction: self.system_instruction,
            avatar_url: self.avatar_url,
            is_default: false,
        }
    }
}

/// In-memory persona list. Persistence is driven by the owner after each
/// mutation, see [`crate::core::app::App::create_persona`].
#[derive(Debug, Clone, Default)]
pub struct PersonaStore {
    personas: Vec<Persona>,
}

impl PersonaStore {
    pub fn new(personas: Vec<Persona>) -> Self {
        Self { personas }
    }

    /// Personas in insertion order.
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Resolve a persona by id, falling back to a case-insensitive name match.
    pub fn find_by_id_or_name(&self, key: &str) -> Option<&Persona> {
        self.find(key).or_else(|| {
            self.personas
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(key.trim()))
        })
    }

    /// Append a new persona under a freshly minted identifier.
    pub fn add(&mut self, draft: PersonaDraft) -> &Persona {
        let mut id = new_id();
        while self.find(&id).is_some() {
            id = new_id();
        }
        self.personas.push(draft.into_persona(id));
        &self.personas[self.personas.len() - 1]
    }

    /// Group personas by category for navigation. Categories appear in the
    /// order they are first seen; personas keep insertion order.
    pub fn grouped_by_category(&self) -> Vec<(PersonaCategory, Vec<&Persona>)> {
        let mut groups: Vec<(PersonaCategory, Vec<&Persona>)> = Vec::new();
        for persona in &self.personas {
            match groups.iter_mut().find(|(cat, _)| *cat == persona.category) {
                Some((_, members)) => members.push(persona),
                None => groups.push((persona.category, vec![persona])),
            }
        }
        groups
    }

    /// Sidebar order: personas flattened group by group.
    pub fn navigation_order(&self) -> Vec<&Persona> {
        self.grouped_by_category()
            .into_iter()
            .flat_map(|(_, members)| members)
            .collect()
    }
}
