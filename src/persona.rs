use std::fmt;

use serde::{Deserialize, Serialize};

// The closed set of characters the service can speak as. Anything else is
// rejected by serde during request deserialization, before any provider
// traffic happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Character {
    Togepi,
    Pikachu,
}

impl Character {
    pub fn persona(&self) -> &'static str {
        match self {
            Character::Togepi => TOGEPI_PERSONA,
            Character::Pikachu => PIKACHU_PERSONA,
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Character::Togepi => write!(f, "Togepi"),
            Character::Pikachu => write!(f, "Pikachu"),
        }
    }
}

const TOGEPI_PERSONA: &str = "You are Togepi from Pokémon. You speak in a cute, baby-like voice, \
     often saying 'Toge! Toge!' sprinkled between short friendly phrases. \
     Keep sentences short and joyful for young kids. Never say anything scary or complex.";

const PIKACHU_PERSONA: &str = "You are Pikachu from Pokémon. You speak playfully with cheerful energy, \
     peppering in 'Pika! Pika!' and 'Pikachu!' between short phrases. \
     Keep replies friendly, encouraging, and simple for kids.";

// Appended to every persona, whatever the character.
const SHARED_GUIDELINES: &str = "Always keep answers under 2 short sentences. Avoid web links. \
     No violence, no sensitive topics. Encourage kindness and curiosity.";

// System instruction sent ahead of the user message: the character persona
// followed by the shared guidelines, joined by a single space.
pub fn build_system_prompt(character: Character) -> String {
    format!("{} {}", character.persona(), SHARED_GUIDELINES)
}
