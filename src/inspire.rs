use rand::Rng;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::color::Palette;
use crate::pipeline::content::generate;
use crate::pipeline::extract::extract_palette_from_bytes;
use crate::uploads::UploadStore;

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Body of a successful `/api/inspire` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptResponse {
    pub idea: String,
    pub guide: String,
    pub critic: String,
    pub palette: Palette,
}

/// Where the response palette came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteSource {
    Image,
    Preset,
}

/// Turns a prompt and an optional image into a [`PromptResponse`].
#[derive(Debug)]
pub struct Inspirer {
    catalog: Catalog,
    uploads: UploadStore,
    palette_size: usize,
}

impl Inspirer {
    /// `catalog` must already be validated for `palette_size`.
    pub fn new(catalog: Catalog, uploads: UploadStore, palette_size: usize) -> Self {
        Self {
            catalog,
            uploads,
            palette_size,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Build a response for a non-empty prompt.
    ///
    /// Image problems never fail the request: storage errors are logged and
    /// extraction errors fall back to a preset palette.
    pub fn respond<R: Rng + ?Sized>(
        &self,
        prompt: &str,
        upload: Option<&Upload>,
        rng: &mut R,
    ) -> (PromptResponse, PaletteSource) {
        let inspiration = generate(&self.catalog, prompt, rng);

        let extracted = upload.and_then(|upload| {
            if let Err(e) = self.uploads.save(&upload.file_name, &upload.bytes) {
                log::warn!("could not store upload {:?}: {e:#}", upload.file_name);
            }
            match extract_palette_from_bytes(&upload.bytes, self.palette_size, &mut *rng) {
                Ok(palette) => Some(palette),
                Err(e) => {
                    log::warn!("palette extraction failed for {:?}: {e}", upload.file_name);
                    None
                }
            }
        });

        let (palette, source) = match extracted {
            Some(palette) => (palette, PaletteSource::Image),
            None => (
                self.catalog.choose_preset(rng).clone(),
                PaletteSource::Preset,
            ),
        };

        let response = PromptResponse {
            idea: inspiration.idea,
            guide: inspiration.guide,
            critic: inspiration.critic,
            palette,
        };
        (response, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use image::{DynamicImage, Rgb, RgbImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn inspirer(dir: &std::path::Path) -> Inspirer {
        Inspirer::new(Catalog::default(), UploadStore::open(dir).unwrap(), 5)
    }

    fn png(rgb: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(12, 12, |_, _| Rgb(rgb)));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn no_image_uses_a_preset() {
        let tmp = tempfile::tempdir().unwrap();
        let inspirer = inspirer(tmp.path());
        let (resp, source) = inspirer.respond("sunset", None, &mut StdRng::seed_from_u64(1));

        assert_eq!(source, PaletteSource::Preset);
        assert!(inspirer.catalog().presets.contains(&resp.palette));
        assert!(resp.idea.contains("sunset"));
    }

    #[test]
    fn image_palette_is_extracted_and_stored() {
        let tmp = tempfile::tempdir().unwrap();
        let inspirer = inspirer(tmp.path());
        let upload = Upload {
            file_name: "solid.png".into(),
            bytes: png([0, 0, 255]),
        };

        let (resp, source) =
            inspirer.respond("sea", Some(&upload), &mut StdRng::seed_from_u64(1));

        assert_eq!(source, PaletteSource::Image);
        assert_eq!(resp.palette.len(), 5);
        let first = resp.palette.colors()[0];
        assert!(first.r <= 1 && first.g <= 1 && first.b >= 254, "{first}");
        assert_eq!(std::fs::read(tmp.path().join("solid.png")).unwrap(), upload.bytes);
    }

    #[test]
    fn corrupt_image_falls_back_but_is_still_stored() {
        let tmp = tempfile::tempdir().unwrap();
        let inspirer = inspirer(tmp.path());
        let upload = Upload {
            file_name: "broken.jpg".into(),
            bytes: b"\xff\xd8 definitely not a jpeg".to_vec(),
        };

        let (resp, source) =
            inspirer.respond("forest", Some(&upload), &mut StdRng::seed_from_u64(2));

        assert_eq!(source, PaletteSource::Preset);
        assert!(inspirer.catalog().presets.contains(&resp.palette));
        assert!(tmp.path().join("broken.jpg").exists());
    }

    #[test]
    fn unstorable_name_still_extracts() {
        let tmp = tempfile::tempdir().unwrap();
        let inspirer = inspirer(tmp.path());
        let upload = Upload {
            file_name: "..".into(),
            bytes: png([255, 255, 0]),
        };

        let (resp, source) =
            inspirer.respond("field", Some(&upload), &mut StdRng::seed_from_u64(3));

        assert_eq!(source, PaletteSource::Image);
        assert_ne!(resp.palette.colors()[0], Color::new(0, 0, 0));
    }

    #[test]
    fn seeded_responses_repeat() {
        let tmp = tempfile::tempdir().unwrap();
        let inspirer = inspirer(tmp.path());
        let a = inspirer.respond("moon", None, &mut StdRng::seed_from_u64(8)).0;
        let b = inspirer.respond("moon", None, &mut StdRng::seed_from_u64(8)).0;
        assert_eq!(a, b);
    }
}
