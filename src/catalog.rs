use std::path::Path;

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{Color, Palette};

/// Placeholder replaced by the prompt text inside a template.
pub const PROMPT_TOKEN: &str = "{prompt}";

/// A sentence skeleton that may embed the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template(pub String);

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Substitute the prompt verbatim for every `{prompt}` token.
    pub fn render(&self, prompt: &str) -> String {
        self.0.replace(PROMPT_TOKEN, prompt)
    }
}

/// Immutable text templates and preset palettes, loaded once at startup.
///
/// Every list is non-empty once [`Catalog::validate`] has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub ideas: Vec<Template>,
    pub guides: Vec<Template>,
    pub critiques: Vec<Template>,
    pub presets: Vec<Palette>,
}

impl Default for Catalog {
    fn default() -> Self {
        let ideas = [
            "Try painting a {prompt} scene in an impressionist style: focus on light and shadow.",
            "Explore an abstract representation of '{prompt}' using flowing brush strokes and bold colors.",
            "How about a minimalistic version of {prompt} with 3 dominant colors?",
        ];
        let guides = [
            "1) Start with a rough pencil sketch.\n\
             2) Block in main colors and shapes.\n\
             3) Add shadows and highlights to create depth.\n\
             4) Work on edges and texture.\n\
             5) Finish with details and signature.",
            "1) Quick tonal study to get values right.\n\
             2) Lay down base midtones.\n\
             3) Build forms and transitions.\n\
             4) Add accents and highlights last.",
        ];
        let critiques = [
            "Your color balance sounds harmonious! Try enhancing contrast between background and subject.",
            "It seems expressive: focus on consistent brush strokes for emotional flow.",
            "Add some warmer tones to balance the cool palette; this will add vibrancy to your piece.",
        ];

        Self {
            ideas: ideas.into_iter().map(Template::new).collect(),
            guides: guides.into_iter().map(Template::new).collect(),
            critiques: critiques.into_iter().map(Template::new).collect(),
            presets: vec![
                preset([0xf6d8ae, 0xe6a57e, 0xda627d, 0xa53860, 0x450920]),
                preset([0x114b5f, 0x1a936f, 0x88d498, 0xc6dabf, 0xf3e9d2]),
                preset([0x03045e, 0x0077b6, 0x00b4d8, 0x90e0ef, 0xcaf0f8]),
                preset([0x432371, 0x714674, 0x9f6976, 0xc78a76, 0xf7a76c]),
            ],
        }
    }
}

fn preset(rgb: [u32; 5]) -> Palette {
    Palette(
        rgb.into_iter()
            .map(|v| Color::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
            .collect(),
    )
}

impl Catalog {
    /// Load a catalog from a JSON file with `ideas`, `guides`, `critiques`
    /// and `presets` keys.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid catalog JSON: {}", path.display()))
    }

    /// Check that every list is non-empty and every preset has exactly
    /// `palette_size` colors.
    pub fn validate(&self, palette_size: usize) -> Result<()> {
        if self.ideas.is_empty() {
            bail!("catalog has no idea templates");
        }
        if self.guides.is_empty() {
            bail!("catalog has no guide templates");
        }
        if self.critiques.is_empty() {
            bail!("catalog has no critique templates");
        }
        if self.presets.is_empty() {
            bail!("catalog has no preset palettes");
        }
        for (i, palette) in self.presets.iter().enumerate() {
            if palette.len() != palette_size {
                bail!(
                    "preset palette {i} has {} colors, expected {palette_size}",
                    palette.len()
                );
            }
        }
        Ok(())
    }

    /// Pick a preset palette uniformly at random.
    pub fn choose_preset<R: Rng + ?Sized>(&self, rng: &mut R) -> &Palette {
        pick(&self.presets, rng)
    }
}

/// Uniform pick from a list the catalog guarantees to be non-empty.
pub(crate) fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn default_catalog_is_valid_for_five_colors() {
        let catalog = Catalog::default();
        catalog.validate(5).unwrap();
        assert_eq!(catalog.ideas.len(), 3);
        assert_eq!(catalog.guides.len(), 2);
        assert_eq!(catalog.critiques.len(), 3);
        assert_eq!(catalog.presets.len(), 4);
    }

    #[test]
    fn default_presets_are_lowercase_hex() {
        let catalog = Catalog::default();
        let first: Vec<String> = catalog.presets[0].colors().iter().map(|c| c.to_hex()).collect();
        assert_eq!(first, ["#f6d8ae", "#e6a57e", "#da627d", "#a53860", "#450920"]);
    }

    #[test]
    fn default_templates_keep_reference_wording() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.ideas[0].render("harbor"),
            "Try painting a harbor scene in an impressionist style: focus on light and shadow."
        );
        assert_eq!(
            catalog.critiques[1].0,
            "It seems expressive: focus on consistent brush strokes for emotional flow."
        );
    }

    #[test]
    fn default_catalog_rejects_other_sizes() {
        let err = Catalog::default().validate(7).unwrap_err();
        assert!(err.to_string().contains("expected 7"), "{err}");
    }

    #[test]
    fn empty_lists_are_rejected() {
        let mut catalog = Catalog::default();
        catalog.critiques.clear();
        assert!(catalog.validate(5).is_err());
    }

    #[test]
    fn render_substitutes_every_token() {
        let t = Template::new("{prompt} and {prompt}");
        assert_eq!(t.render("rain"), "rain and rain");
        assert_eq!(Template::new("no token").render("rain"), "no token");
    }

    #[test]
    fn choose_preset_is_a_member() {
        let catalog = Catalog::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let palette = catalog.choose_preset(&mut rng);
            assert!(catalog.presets.contains(palette));
        }
    }

    #[test]
    fn load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{
                "ideas": ["Paint {{prompt}} at dawn."],
                "guides": ["1) Sketch.\n2) Paint."],
                "critiques": ["Nice."],
                "presets": [["#000000", "#FFFFFF", "#ff0000"]]
            }}"##
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        catalog.validate(3).unwrap();
        assert_eq!(catalog.ideas[0].render("hills"), "Paint hills at dawn.");
        assert_eq!(catalog.presets[0].colors()[1], Color::new(255, 255, 255));
    }

    #[test]
    fn load_reports_bad_hex() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ideas": ["a"], "guides": ["b"], "critiques": ["c"], "presets": [["nope"]]}}"#
        )
        .unwrap();

        let err = Catalog::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid catalog JSON"), "{err}");
    }

    #[test]
    fn load_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read catalog"));
    }
}
