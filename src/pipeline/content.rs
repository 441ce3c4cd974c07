use rand::Rng;

use crate::catalog::{pick, Catalog};

/// The text half of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspiration {
    pub idea: String,
    pub guide: String,
    pub critic: String,
}

/// Pick one idea, guide and critique uniformly at random.
///
/// Idea and guide templates get the prompt substituted in; critiques are
/// used as-is.
pub fn generate<R: Rng + ?Sized>(catalog: &Catalog, prompt: &str, rng: &mut R) -> Inspiration {
    let idea = pick(&catalog.ideas, rng).render(prompt);
    let guide = pick(&catalog.guides, rng).render(prompt);
    let critic = pick(&catalog.critiques, rng).0.clone();
    Inspiration {
        idea,
        guide,
        critic,
    }
}
