//! Blurred memory cards brought into focus one by one

use std::collections::BTreeMap;

use crate::Millis;
use crate::consts::MEMORY_DWELL_MS;
use crate::story::gate::{Act, CompletionGate};

/// Load state of a card's image as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStatus {
    #[default]
    Loading,
    Loaded,
    Failed,
}

/// What a card shows behind its blur/caption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardVisual {
    Image,
    /// Soft gradient with a heart glyph; used until (and unless) the image loads
    Placeholder,
}

/// 3D tilt of a revealed card following the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tilt {
    /// Degrees
    pub rotate_x: f32,
    /// Degrees
    pub rotate_y: f32,
    pub scale: f32,
}

impl Tilt {
    pub const IDENTITY: Tilt = Tilt {
        rotate_x: 0.0,
        rotate_y: 0.0,
        scale: 1.0,
    };

    /// Tilt for a pointer at (x, y) within the card, both normalized to [0, 1]
    pub fn toward(x: f32, y: f32) -> Self {
        Self {
            rotate_x: (y - 0.5) * -10.0,
            rotate_y: (x - 0.5) * 10.0,
            scale: 1.02,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GalleryStage {
    ids: Vec<u32>,
    gate: CompletionGate<u32>,
    images: BTreeMap<u32, ImageStatus>,
    tilts: BTreeMap<u32, Tilt>,
}

impl GalleryStage {
    /// Cards in display order
    pub fn new(ids: Vec<u32>) -> Self {
        Self {
            gate: CompletionGate::new(ids.iter().copied(), MEMORY_DWELL_MS),
            images: ids.iter().map(|&id| (id, ImageStatus::Loading)).collect(),
            tilts: BTreeMap::new(),
            ids,
        }
    }

    /// Reveal a card; revealed or unknown ids are ignored
    pub fn reveal(&mut self, id: u32, now: Millis) -> Act {
        let act = self.gate.act(id, now);
        if let Act::Accepted { count, .. } = act {
            log::debug!("Revealed memory {} ({}/{})", id, count, self.ids.len());
        }
        act
    }

    pub fn image_loaded(&mut self, id: u32) {
        if let Some(status) = self.images.get_mut(&id) {
            *status = ImageStatus::Loaded;
        }
    }

    /// A broken image degrades to the placeholder, never blocks the stage
    pub fn image_failed(&mut self, id: u32) {
        if let Some(status) = self.images.get_mut(&id) {
            log::warn!("Memory {} image failed to load, using placeholder", id);
            *status = ImageStatus::Failed;
        }
    }

    pub fn image_status(&self, id: u32) -> ImageStatus {
        self.images.get(&id).copied().unwrap_or_default()
    }

    pub fn visual(&self, id: u32) -> CardVisual {
        match self.image_status(id) {
            ImageStatus::Loaded => CardVisual::Image,
            ImageStatus::Loading | ImageStatus::Failed => CardVisual::Placeholder,
        }
    }

    /// Pointer moved over a card; only revealed cards tilt
    pub fn pointer_over(&mut self, id: u32, x: f32, y: f32) {
        if self.gate.is_acted(id) {
            self.tilts.insert(id, Tilt::toward(x, y));
        }
    }

    pub fn pointer_left(&mut self, id: u32) {
        self.tilts.remove(&id);
    }

    pub fn tilt(&self, id: u32) -> Tilt {
        self.tilts.get(&id).copied().unwrap_or(Tilt::IDENTITY)
    }

    pub fn tick(&mut self, now: Millis) -> bool {
        self.gate.poll(now)
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.gate.deadline()
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn is_revealed(&self, id: u32) -> bool {
        self.gate.is_acted(id)
    }

    pub fn progress(&self) -> f32 {
        self.gate.progress()
    }

    pub fn all_revealed(&self) -> bool {
        self.gate.is_saturated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_all_completes() {
        let mut gallery = GalleryStage::new(vec![1, 2, 3, 4]);
        for id in [4, 2, 1, 3] {
            assert!(gallery.reveal(id, 100.0).is_accepted());
        }
        assert_eq!(gallery.reveal(4, 200.0), Act::Ignored);
        assert!(gallery.all_revealed());
        assert!(!gallery.tick(1599.0));
        assert!(gallery.tick(1600.0));
    }

    #[test]
    fn test_placeholder_until_loaded() {
        let mut gallery = GalleryStage::new(vec![1, 2]);
        assert_eq!(gallery.visual(1), CardVisual::Placeholder);
        gallery.image_loaded(1);
        gallery.image_failed(2);
        assert_eq!(gallery.visual(1), CardVisual::Image);
        assert_eq!(gallery.visual(2), CardVisual::Placeholder);
        assert_eq!(gallery.image_status(2), ImageStatus::Failed);
        // Unknown ids never panic
        gallery.image_failed(99);
        assert_eq!(gallery.visual(99), CardVisual::Placeholder);
    }

    #[test]
    fn test_failed_image_does_not_block_completion() {
        let mut gallery = GalleryStage::new(vec![1]);
        gallery.image_failed(1);
        gallery.reveal(1, 0.0);
        assert!(gallery.tick(MEMORY_DWELL_MS));
    }

    #[test]
    fn test_tilt_only_when_revealed() {
        let mut gallery = GalleryStage::new(vec![1]);
        gallery.pointer_over(1, 1.0, 0.0);
        assert_eq!(gallery.tilt(1), Tilt::IDENTITY);

        gallery.reveal(1, 0.0);
        gallery.pointer_over(1, 1.0, 0.0);
        let tilt = gallery.tilt(1);
        assert!((tilt.rotate_y - 5.0).abs() < 1e-6);
        assert!((tilt.rotate_x - 5.0).abs() < 1e-6);
        assert!((tilt.scale - 1.02).abs() < 1e-6);

        gallery.pointer_left(1);
        assert_eq!(gallery.tilt(1), Tilt::IDENTITY);
    }
}
