//! Sealed envelopes, opened in any order

use crate::Millis;
use crate::consts::NOTES_DWELL_MS;
use crate::story::gate::{Act, CompletionGate};

#[derive(Debug, Clone)]
pub struct NotesStage {
    ids: Vec<u32>,
    gate: CompletionGate<u32>,
}

impl NotesStage {
    /// Envelopes in display order
    pub fn new(ids: Vec<u32>) -> Self {
        Self {
            gate: CompletionGate::new(ids.iter().copied(), NOTES_DWELL_MS),
            ids,
        }
    }

    /// Open an envelope; opened or unknown ids are ignored
    pub fn open(&mut self, id: u32, now: Millis) -> Act {
        let act = self.gate.act(id, now);
        match act {
            Act::Accepted { count, .. } => {
                log::debug!("Opened note {} ({}/{})", id, count, self.ids.len())
            }
            Act::Ignored => log::debug!("Note {} already open or unknown", id),
        }
        act
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

    pub fn is_open(&self, id: u32) -> bool {
        self.gate.is_acted(id)
    }

    pub fn progress(&self) -> f32 {
        self.gate.progress()
    }

    /// Every envelope is open; the closing message shows
    pub fn all_open(&self) -> bool {
        self.gate.is_saturated()
    }
}
