//! Top-level composition
//!
//! `Story` owns the stage controller, the mounted stage component, the
//! ambient visuals and the session RNG. The host feeds it inputs and
//! timestamps; logic runs in `handle`/`poll`, drawing in `frame`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::Millis;
use crate::ambient::{ParticleField, PointerLight, normalize_pointer};
use crate::config::{MemoryStageKind, StoryConfig};
use crate::consts::FRAME_DT;
use crate::renderer::{DrawSurface, palette};
use crate::story::{
    Act, Celebration, EntryStage, FinalReveal, GalleryStage, HeartStage, NotesStage, Stage,
    StageController, StoryEvent, TimelineStage, earliest,
};

/// Burst sparkle radius (px)
const BURST_SPRITE_RADIUS: f32 = 5.0;

/// Everything the host can tell the story
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoryInput {
    /// Press the entry screen's open button
    Open,
    TapHeart,
    OpenNote(u32),
    RevealMemory(u32),
    SelectEvent(u32),
    /// Pointer entered (or touch started on) the "No" button
    HoverNo,
    ChooseYes,
    /// Pointer position in viewport pixels
    PointerMove { x: f32, y: f32 },
    Resize { width: f32, height: f32 },
    ImageLoaded(u32),
    ImageFailed(u32),
    /// Pointer over a memory card, position normalized within the card
    CardHover { id: u32, x: f32, y: f32 },
    CardLeave(u32),
}

/// The component mounted for the current stage
#[derive(Debug, Clone)]
pub enum ActiveStage {
    Entry(EntryStage),
    Heart(HeartStage),
    Notes(NotesStage),
    Gallery(GalleryStage),
    Timeline(TimelineStage),
    Reveal(FinalReveal),
    Celebration(Celebration),
}

impl ActiveStage {
    fn mount(stage: Stage, config: &StoryConfig, now: Millis) -> Self {
        match stage {
            Stage::Entry => ActiveStage::Entry(EntryStage::new()),
            Stage::Heart => {
                ActiveStage::Heart(HeartStage::new(config.heart_affirmation.affirmations.len()))
            }
            Stage::Memory => match config.memory_stage {
                MemoryStageKind::Gallery => ActiveStage::Gallery(GalleryStage::new(
                    config.memory_gallery.memories.iter().map(|m| m.id).collect(),
                )),
                MemoryStageKind::Notes => ActiveStage::Notes(NotesStage::new(
                    config.love_notes.notes.iter().map(|n| n.id).collect(),
                )),
            },
            Stage::Timeline => ActiveStage::Timeline(TimelineStage::new(
                config.love_timeline.events.iter().map(|e| e.id).collect(),
                now,
            )),
            Stage::Reveal => {
                ActiveStage::Reveal(FinalReveal::new(config.final_reveal.reveal_lines.len(), now))
            }
            Stage::Celebration => ActiveStage::Celebration(Celebration::new()),
        }
    }

    /// Returns true once when the component's completion fires
    fn tick(&mut self, now: Millis, events: &mut Vec<StoryEvent>) -> bool {
        match self {
            ActiveStage::Entry(s) => s.tick(now),
            ActiveStage::Heart(s) => s.tick(now, events),
            ActiveStage::Notes(s) => s.tick(now),
            ActiveStage::Gallery(s) => s.tick(now),
            ActiveStage::Timeline(s) => s.tick(now),
            ActiveStage::Reveal(s) => s.tick(now, events),
            ActiveStage::Celebration(_) => false,
        }
    }

    fn deadline(&self) -> Option<Millis> {
        match self {
            ActiveStage::Entry(s) => s.deadline(),
            ActiveStage::Heart(s) => s.deadline(),
            ActiveStage::Notes(s) => s.deadline(),
            ActiveStage::Gallery(s) => s.deadline(),
            ActiveStage::Timeline(s) => s.deadline(),
            ActiveStage::Reveal(s) => s.deadline(),
            ActiveStage::Celebration(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActiveStage::Entry(_) => "entry",
            ActiveStage::Heart(_) => "heart",
            ActiveStage::Notes(_) => "notes",
            ActiveStage::Gallery(_) => "gallery",
            ActiveStage::Timeline(_) => "timeline",
            ActiveStage::Reveal(_) => "reveal",
            ActiveStage::Celebration(_) => "celebration",
        }
    }
}

/// Content of one envelope, card, timeline event or heart dot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemText {
    pub id: u32,
    /// Opened, revealed, viewed, or (for a heart dot) filled
    pub acted: bool,
    /// The selected timeline event
    pub active: bool,
    pub label: String,
    /// Note message once opened, event date
    pub detail: String,
    pub image: Option<String>,
}

/// Labels of the final question's buttons
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Choices {
    pub yes: String,
    pub no: String,
    pub interactive: bool,
}

/// Text the host should display for the mounted stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageText {
    pub title: String,
    pub body: String,
    /// Button label or transient hint
    pub action: String,
    /// Per-item content in display order
    pub items: Vec<ItemText>,
    /// Share of gated items acted on, for the progress bar
    pub progress: Option<f32>,
    pub choices: Option<Choices>,
}

pub struct Story {
    config: StoryConfig,
    controller: StageController,
    active: Option<ActiveStage>,
    rng: Pcg32,
    field: ParticleField,
    light: PointerLight,
    viewport: Vec2,
    events: Vec<StoryEvent>,
    last_frame: Option<Millis>,
}

impl Story {
    /// Start a session at the entry stage; `config.seed` wins over `seed`
    pub fn new(config: StoryConfig, seed: u64, viewport: Vec2, now: Millis) -> Self {
        // An empty gated list would never complete
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Invalid story config ({e}), using the default story");
                StoryConfig::default()
            }
        };
        let seed = config.seed.unwrap_or(seed);
        log::info!(
            "Story starting (seed {}, memory stage: {})",
            seed,
            config.memory_stage.as_str()
        );
        let active = ActiveStage::mount(Stage::Entry, &config, now);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            field: ParticleField::new(seed.wrapping_add(1), viewport.x, viewport.y),
            light: PointerLight::default(),
            controller: StageController::new(),
            active: Some(active),
            viewport,
            events: vec![StoryEvent::StageMounted(Stage::Entry)],
            last_frame: None,
            config,
        }
    }

    /// Apply one input, then run any timers that are due
    pub fn handle(&mut self, input: StoryInput, now: Millis) {
        self.poll(now);

        match input {
            StoryInput::PointerMove { x, y } => {
                self.light
                    .set_target(normalize_pointer(Vec2::new(x, y), self.viewport));
            }
            StoryInput::Resize { width, height } => {
                self.viewport = Vec2::new(width, height);
                self.field.resize(width, height);
            }
            _ => self.handle_stage_input(input, now),
        }

        self.poll(now);
    }

    fn handle_stage_input(&mut self, input: StoryInput, now: Millis) {
        let stage = self.controller.current();
        let Some(active) = self.active.as_mut() else {
            log::debug!("Ignoring {:?} during transition into {}", input, stage.as_str());
            return;
        };
        let events = &mut self.events;

        let act = match (active, input) {
            (ActiveStage::Entry(s), StoryInput::Open) => {
                s.open(now);
                return;
            }
            (ActiveStage::Heart(s), StoryInput::TapHeart) => {
                s.tap(now, events);
                return;
            }
            (ActiveStage::Notes(s), StoryInput::OpenNote(id)) => (id, s.open(id, now)),
            (ActiveStage::Gallery(s), StoryInput::RevealMemory(id)) => (id, s.reveal(id, now)),
            (ActiveStage::Timeline(s), StoryInput::SelectEvent(id)) => (id, s.select(id, now)),
            (ActiveStage::Gallery(s), StoryInput::ImageLoaded(id)) => {
                s.image_loaded(id);
                return;
            }
            (ActiveStage::Gallery(s), StoryInput::ImageFailed(id)) => {
                s.image_failed(id);
                return;
            }
            (ActiveStage::Gallery(s), StoryInput::CardHover { id, x, y }) => {
                s.pointer_over(id, x, y);
                return;
            }
            (ActiveStage::Gallery(s), StoryInput::CardLeave(id)) => {
                s.pointer_left(id);
                return;
            }
            (ActiveStage::Reveal(s), StoryInput::HoverNo) => {
                s.attempt_no(now, &mut self.rng, events);
                return;
            }
            (ActiveStage::Reveal(s), StoryInput::ChooseYes) => {
                s.choose_yes(now, &mut self.rng, events);
                return;
            }
            (active, input) => {
                log::debug!("Ignoring {:?} on {} stage", input, active.name());
                return;
            }
        };

        if let (id, Act::Accepted { count, .. }) = act {
            let required = self.required_items();
            self.events.push(StoryEvent::ItemActed {
                stage,
                id,
                count,
                required,
            });
        }
    }

    fn required_items(&self) -> usize {
        match &self.active {
            Some(ActiveStage::Notes(s)) => s.ids().len(),
            Some(ActiveStage::Gallery(s)) => s.ids().len(),
            Some(ActiveStage::Timeline(s)) => s.ids().len(),
            _ => 0,
        }
    }

    /// Fire due timers: mount after transitions, advance after completions
    pub fn poll(&mut self, now: Millis) {
        loop {
            let mut progressed = false;

            if let Some(stage) = self.controller.poll(now) {
                self.active = Some(ActiveStage::mount(stage, &self.config, now));
                self.events.push(StoryEvent::StageMounted(stage));
                log::debug!("Mounted {}", stage.as_str());
                progressed = true;
            }

            let completed = self
                .active
                .as_mut()
                .is_some_and(|active| active.tick(now, &mut self.events));
            if completed {
                let stage = self.controller.current();
                log::info!("Stage {} complete", stage.as_str());
                self.events.push(StoryEvent::StageCompleted(stage));
                if let Some(next) = stage.next()
                    && self.controller.advance(next, now)
                {
                    // Dropping the component drops its timers
                    self.active = None;
                    self.events.push(StoryEvent::StageEntered(next));
                    progressed = true;
                }
            }

            if !progressed {
                break;
            }
        }
    }

    /// Advance the ambient visuals by one display frame and draw them
    pub fn frame<S: DrawSurface>(&mut self, now: Millis, surface: &mut S) {
        let dt = self
            .last_frame
            .map(|last| ((now - last) / 1000.0) as f32)
            .unwrap_or(FRAME_DT);
        self.last_frame = Some(now);

        self.light.step(dt);
        self.field.update();

        let dark = self.is_dark();
        surface.clear(self.viewport.x, self.viewport.y);
        self.field.render(surface, dark);
        self.light.render(surface, self.viewport, dark);
        self.render_burst(surface, now);
    }

    fn render_burst<S: DrawSurface>(&self, surface: &mut S, now: Millis) {
        let Some(ActiveStage::Reveal(reveal)) = &self.active else {
            return;
        };
        let Some(burst) = reveal.burst() else {
            return;
        };
        let color = palette::BURST;
        for sprite in burst.sprites(now) {
            let center = Vec2::new(sprite.x_pct, sprite.y_pct) / 100.0 * self.viewport;
            surface.radial_glow(
                center,
                BURST_SPRITE_RADIUS,
                color.with_alpha(sprite.alpha),
                color.transparent(),
            );
        }
    }

    /// When the next timer is due, for a single host wake-up
    pub fn next_deadline(&self) -> Option<Millis> {
        earliest([
            self.controller.deadline(),
            self.active.as_ref().and_then(|a| a.deadline()),
        ])
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<StoryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Text for the mounted stage; empty during transitions
    pub fn text(&self) -> StageText {
        let Some(active) = &self.active else {
            return StageText::default();
        };
        let c = &self.config;
        match active {
            ActiveStage::Entry(_) => StageText {
                title: c.entry.heading.clone(),
                body: c.entry.subtitle.clone(),
                action: c.entry.button_text.clone(),
                ..StageText::default()
            },
            ActiveStage::Heart(s) => StageText {
                title: if s.is_unlocked() {
                    c.heart_affirmation.unlock_message.clone()
                } else {
                    c.heart_affirmation.instruction.clone()
                },
                body: s
                    .shown()
                    .and_then(|i| c.heart_affirmation.affirmations.get(i))
                    .cloned()
                    .unwrap_or_default(),
                items: s
                    .dots()
                    .into_iter()
                    .zip(0..)
                    .map(|(filled, id)| ItemText {
                        id,
                        acted: filled,
                        ..ItemText::default()
                    })
                    .collect(),
                ..StageText::default()
            },
            ActiveStage::Notes(s) => StageText {
                title: c.love_notes.heading.clone(),
                body: if s.all_open() {
                    c.love_notes.completion_message.clone()
                } else {
                    c.love_notes.subtitle.clone()
                },
                items: c
                    .love_notes
                    .notes
                    .iter()
                    .map(|note| {
                        let open = s.is_open(note.id);
                        ItemText {
                            id: note.id,
                            acted: open,
                            detail: if open {
                                note.message.clone()
                            } else {
                                String::new()
                            },
                            ..ItemText::default()
                        }
                    })
                    .collect(),
                progress: Some(s.progress()),
                ..StageText::default()
            },
            ActiveStage::Gallery(s) => StageText {
                title: c.memory_gallery.heading.clone(),
                body: if s.all_revealed() {
                    c.memory_gallery.completion_message.clone()
                } else {
                    c.memory_gallery.subtitle.clone()
                },
                items: c
                    .memory_gallery
                    .memories
                    .iter()
                    .map(|memory| ItemText {
                        id: memory.id,
                        acted: s.is_revealed(memory.id),
                        label: memory.caption.clone(),
                        image: (!memory.image.is_empty()).then(|| memory.image.clone()),
                        ..ItemText::default()
                    })
                    .collect(),
                progress: Some(s.progress()),
                ..StageText::default()
            },
            ActiveStage::Timeline(s) => {
                let event = c.love_timeline.events.iter().find(|e| e.id == s.active());
                StageText {
                    title: event
                        .map(|e| format!("{} · {}", e.date, e.title))
                        .unwrap_or_else(|| c.love_timeline.heading.clone()),
                    body: event.map(|e| e.text.clone()).unwrap_or_default(),
                    action: if s.all_viewed() {
                        c.love_timeline.completion_message.clone()
                    } else {
                        c.love_timeline.swipe_hint.clone()
                    },
                    items: c
                        .love_timeline
                        .events
                        .iter()
                        .map(|e| ItemText {
                            id: e.id,
                            acted: s.is_viewed(e.id),
                            active: e.id == s.active(),
                            label: e.title.clone(),
                            detail: e.date.clone(),
                            image: None,
                        })
                        .collect(),
                    progress: Some(s.progress()),
                    ..StageText::default()
                }
            }
            ActiveStage::Reveal(s) => {
                let reveal = &c.final_reveal;
                let title = if s.is_answered() {
                    reveal.yes_message.clone()
                } else if s.question_visible() {
                    reveal.question.clone()
                } else {
                    String::new()
                };
                let body = reveal.reveal_lines[s.visible_lines()].join("\n");
                let action = if s.playful_visible() {
                    reveal.no_hover_message.clone()
                } else {
                    String::new()
                };
                let choices = (s.question_visible() && !s.is_answered()).then(|| Choices {
                    yes: reveal.yes_button_text.clone(),
                    no: reveal.no_button_text.clone(),
                    interactive: s.choices_interactive(),
                });
                StageText {
                    title,
                    body,
                    action,
                    choices,
                    ..StageText::default()
                }
            }
            ActiveStage::Celebration(_) => StageText {
                title: c.celebration.thank_you_message.clone(),
                body: c.celebration.description.clone(),
                action: c.celebration.closing.clone(),
                ..StageText::default()
            },
        }
    }

    /// Heart tap ripples still animating, as (id, progress in [0, 1])
    pub fn ripples(&self, now: Millis) -> Vec<(u32, f32)> {
        match &self.active {
            Some(ActiveStage::Heart(heart)) => heart
                .ripples()
                .iter()
                .map(|r| (r.id, r.progress(now)))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn current_stage(&self) -> Stage {
        self.controller.current()
    }

    pub fn controller(&self) -> &StageController {
        &self.controller
    }

    pub fn active(&self) -> Option<&ActiveStage> {
        self.active.as_ref()
    }

    /// Dark palette flag read by the ambient layer
    pub fn is_dark(&self) -> bool {
        self.controller.current().is_dark()
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn light(&self) -> &PointerLight {
        &self.light
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingSurface;

    fn story() -> Story {
        Story::new(StoryConfig::default(), 42, Vec2::new(800.0, 600.0), 0.0)
    }

    #[test]
    fn test_entry_advances_to_heart_after_exit() {
        let mut story = story();
        assert_eq!(story.active().map(|a| a.name()), Some("entry"));
        story.handle(StoryInput::Open, 100.0);
        assert_eq!(story.current_stage(), Stage::Heart);
        assert!(story.active().is_none());
        assert_eq!(story.next_deadline(), Some(1300.0));

        story.poll(1300.0);
        assert_eq!(story.active().map(|a| a.name()), Some("heart"));
        let events = story.drain_events();
        assert_eq!(
            events,
            vec![
                StoryEvent::StageMounted(Stage::Entry),
                StoryEvent::StageCompleted(Stage::Entry),
                StoryEvent::StageEntered(Stage::Heart),
                StoryEvent::StageMounted(Stage::Heart),
            ]
        );
    }

    #[test]
    fn test_input_ignored_during_transition() {
        let mut story = story();
        story.handle(StoryInput::Open, 0.0);
        story.handle(StoryInput::TapHeart, 10.0);
        story.poll(1200.0);
        match story.active() {
            Some(ActiveStage::Heart(heart)) => assert_eq!(heart.taps(), 0),
            other => panic!("expected heart, got {:?}", other.map(|a| a.name())),
        }
    }

    #[test]
    fn test_mismatched_input_ignored() {
        let mut story = story();
        story.handle(StoryInput::TapHeart, 0.0);
        story.handle(StoryInput::ChooseYes, 0.0);
        assert_eq!(story.current_stage(), Stage::Entry);
        assert_eq!(story.drain_events(), vec![StoryEvent::StageMounted(Stage::Entry)]);
    }

    #[test]
    fn test_notes_memory_stage() {
        let config = StoryConfig {
            memory_stage: MemoryStageKind::Notes,
            ..StoryConfig::default()
        };
        let mut story = Story::new(config, 1, Vec2::new(800.0, 600.0), 0.0);
        story.handle(StoryInput::Open, 0.0);
        story.poll(1200.0);
        for i in 0..5 {
            story.handle(StoryInput::TapHeart, 1200.0 + i as f64);
        }
        story.poll(5000.0);
        story.poll(5800.0);
        assert_eq!(story.active().map(|a| a.name()), Some("notes"));
        story.drain_events();
        story.handle(StoryInput::OpenNote(3), 6000.0);
        assert_eq!(
            story.drain_events(),
            vec![StoryEvent::ItemActed {
                stage: Stage::Memory,
                id: 3,
                count: 1,
                required: 6
            }]
        );
    }

    /// Open the entry, tap through the heart and mount the memory stage
    fn story_at_memory(config: StoryConfig) -> Story {
        let mut story = Story::new(config, 1, Vec2::new(800.0, 600.0), 0.0);
        story.handle(StoryInput::Open, 0.0);
        story.poll(1200.0);
        for i in 0..10 {
            story.handle(StoryInput::TapHeart, 1200.0 + i as f64);
        }
        story.poll(5000.0);
        story.poll(5800.0);
        story
    }

    #[test]
    fn test_opened_note_shows_message() {
        let config = StoryConfig {
            memory_stage: MemoryStageKind::Notes,
            ..StoryConfig::default()
        };
        let message = config.love_notes.notes[2].message.clone();
        let mut story = story_at_memory(config);
        let sealed = story.text();
        assert_eq!(sealed.items.len(), 6);
        assert!(sealed.items.iter().all(|i| !i.acted && i.detail.is_empty()));
        assert_eq!(sealed.progress, Some(0.0));

        story.handle(StoryInput::OpenNote(3), 6000.0);
        let text = story.text();
        let note = text.items.iter().find(|i| i.id == 3).unwrap();
        assert!(note.acted);
        assert_eq!(note.detail, message);
        assert!(text.items.iter().filter(|i| i.id != 3).all(|i| i.detail.is_empty()));
        assert!((text.progress.unwrap() - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_gallery_items_carry_caption_and_image() {
        let mut story = story_at_memory(StoryConfig::default());
        story.handle(StoryInput::RevealMemory(2), 6000.0);
        let text = story.text();
        let memories = &story.config().memory_gallery.memories;
        assert_eq!(text.items.len(), memories.len());
        for (item, memory) in text.items.iter().zip(memories) {
            assert_eq!(item.id, memory.id);
            assert_eq!(item.label, memory.caption);
            assert_eq!(item.image.as_deref(), Some(memory.image.as_str()));
            assert_eq!(item.acted, memory.id == 2);
        }
        assert_eq!(text.progress, Some(0.25));
    }

    #[test]
    fn test_heart_dots_and_ripples() {
        let mut story = story();
        story.handle(StoryInput::Open, 0.0);
        story.poll(1200.0);
        story.handle(StoryInput::TapHeart, 1200.0);
        story.handle(StoryInput::TapHeart, 1300.0);

        let dots: Vec<bool> = story.text().items.iter().map(|i| i.acted).collect();
        assert_eq!(dots, vec![true, true, false, false, false]);
        assert_eq!(story.text().progress, None);

        let ripples = story.ripples(1300.0);
        assert_eq!(ripples.len(), 2);
        assert_eq!(ripples[0].0, 0);
        assert!((ripples[0].1 - 0.1).abs() < 1e-6);
        assert_eq!(ripples[1], (1, 0.0));

        story.poll(2250.0);
        assert_eq!(story.ripples(2250.0).len(), 1);
        assert!(story.ripples(2250.0).iter().all(|&(id, _)| id == 1));
    }

    #[test]
    fn test_empty_affirmations_fall_back_to_default_story() {
        let mut config = StoryConfig::default();
        config.heart_affirmation.affirmations.clear();
        let story = story_at_memory(config);
        assert_eq!(story.config().heart_affirmation.affirmations.len(), 5);
        assert_eq!(story.current_stage(), Stage::Memory);
        assert!(story.active().is_some());
    }

    #[test]
    fn test_dark_only_during_reveal() {
        let story = story();
        assert!(!story.is_dark());
    }

    #[test]
    fn test_frame_draws_field_and_light() {
        let mut story = story();
        let mut surface = RecordingSurface::new();
        story.frame(16.0, &mut surface);
        // 12 particles at 800x600 plus the pointer light
        assert_eq!(surface.glows_since_clear(), 13);
        story.handle(
            StoryInput::Resize {
                width: 400.0,
                height: 400.0,
            },
            20.0,
        );
        story.frame(32.0, &mut surface);
        assert_eq!(surface.glows_since_clear(), 5);
    }

    #[test]
    fn test_entry_text() {
        let story = story();
        let text = story.text();
        assert_eq!(text.title, story.config().entry.heading);
        assert_eq!(text.action, story.config().entry.button_text);
    }
}
