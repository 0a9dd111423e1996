//! Static voice, style and caption catalogs.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::labeling::Gender;

mod styles;
pub mod templates;
mod voices;

pub use templates::{DescriptionTemplater, TemplateId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// Catalog gender; unset for voices the catalog does not know
    pub gender: Option<Gender>,
    /// Pitch character of the voice, reported when a sample is planned
    pub pitch: Option<String>,
}

impl Voice {
    /// A caller-named voice outside the catalog
    pub fn unlisted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gender: None,
            pitch: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
    styles: Vec<String>,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VoiceCatalog {
    pub fn builtin() -> Self {
        Self {
            voices: voices::BUILTIN_VOICES
                .iter()
                .map(|(name, gender, pitch)| Voice {
                    name: name.to_string(),
                    gender: Some(*gender),
                    pitch: Some(pitch.to_string()),
                })
                .collect(),
            styles: styles::BUILTIN_STYLES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    pub fn find_voice(&self, name: &str) -> Option<&Voice> {
        self.voices
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }

    pub fn pick_voice<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Voice> {
        self.voices.choose(rng)
    }

    pub fn pick_style<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.styles.choose(rng).map(String::as_str)
    }

    /// The named voice (catalog entry if known, unlisted otherwise), or a
    /// uniform random catalog voice when no name is given.
    pub fn resolve_voice<R: Rng + ?Sized>(&self, name: Option<&str>, rng: &mut R) -> Option<Voice> {
        match name {
            Some(name) => Some(
                self.find_voice(name)
                    .cloned()
                    .unwrap_or_else(|| Voice::unlisted(name)),
            ),
            None => self.pick_voice(rng).cloned(),
        }
    }

    pub fn resolve_style<R: Rng + ?Sized>(&self, style: Option<&str>, rng: &mut R) -> Option<String> {
        match style {
            Some(style) => Some(style.to_string()),
            None => self.pick_style(rng).map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = VoiceCatalog::builtin();
        assert_eq!(catalog.voices().len(), 10);
        assert_eq!(catalog.styles().len(), 26);
        assert!(catalog
            .voices()
            .iter()
            .all(|v| v.gender.is_some() && v.pitch.is_some()));
        assert_eq!(Voice::unlisted("Fenrir").pitch, None);

        let male: Vec<&str> = catalog
            .voices()
            .iter()
            .filter(|v| v.gender == Some(Gender::Male))
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(male, vec!["Puck", "Zephyr", "Charon", "Orus"]);
    }

    #[test]
    fn test_resolve_named_voice() {
        let catalog = VoiceCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);

        let kore = catalog.resolve_voice(Some("kore"), &mut rng).unwrap();
        assert_eq!(kore.name, "Kore");
        assert_eq!(kore.gender, Some(Gender::Female));

        let custom = catalog.resolve_voice(Some("Fenrir"), &mut rng).unwrap();
        assert_eq!(custom, Voice::unlisted("Fenrir"));
    }

    #[test]
    fn test_random_selection_is_reproducible_with_seed() {
        let catalog = VoiceCatalog::builtin();
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| {
                    let voice = catalog.resolve_voice(None, &mut rng).unwrap().name;
                    let style = catalog.resolve_style(None, &mut rng).unwrap();
                    (voice, style)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_explicit_style_is_kept_verbatim() {
        let catalog = VoiceCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            catalog.resolve_style(Some("sarcastic"), &mut rng).unwrap(),
            "sarcastic"
        );
    }
}
