//! Sprites, their frames and the parts a frame is built from.

use serde::Serialize;

/// Upper bound on state ids and frames, set by their u16 counts.
pub const MAX_ENTRIES: usize = 0x1_0000;

/// One rectangle cut from a texture and placed relative to the sprite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpritePart {
    pub name: String,
    pub collision: bool,
    pub offset: [f32; 2],
    pub texture_offset: [f32; 2],
    pub size: [u32; 2],
    pub flipped_horizontally: bool,
    pub flipped_vertically: bool,
}

impl SpritePart {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A timed set of parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpriteFrame {
    /// Seconds the frame stays on screen.
    pub frame_time: f32,
    pub parts: Vec<SpritePart>,
}

impl SpriteFrame {
    #[must_use]
    pub const fn new(frame_time: f32) -> Self {
        Self {
            frame_time,
            parts: Vec::new(),
        }
    }

    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

/// A named animation.
///
/// State ids index into the container's textures. The current state and
/// frame form a playback cursor that is not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sprite {
    name: String,
    state_ids: Vec<u16>,
    frames: Vec<SpriteFrame>,
    #[serde(skip)]
    position: [f32; 2],
    #[serde(skip)]
    current_state: usize,
    #[serde(skip)]
    current_frame: usize,
}

impl Sprite {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub const fn position(&self) -> [f32; 2] {
        self.position
    }

    pub const fn set_position(&mut self, x: f32, y: f32) {
        self.position = [x, y];
    }

    // ------------------------------------------------------------------
    // States
    // ------------------------------------------------------------------

    /// Adds a state id unless it is already present or the list is full.
    pub fn add_state_id(&mut self, id: u16) {
        if self.state_ids.len() >= MAX_ENTRIES || self.state_ids.contains(&id) {
            return;
        }
        self.state_ids.push(id);
    }

    #[must_use]
    pub fn state_id(&self, index: usize) -> Option<u16> {
        self.state_ids.get(index).copied()
    }

    /// Replaces all state ids. An empty list is ignored.
    pub fn set_state_ids(&mut self, ids: Vec<u16>) {
        if ids.is_empty() {
            return;
        }
        self.state_ids = ids;
        self.current_state = self.current_state.min(self.state_ids.len() - 1);
    }

    #[must_use]
    pub fn state_ids(&self) -> &[u16] {
        &self.state_ids
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.state_ids.len()
    }

    /// Selects a state. Returns false, leaving the cursor alone, when
    /// `index` is not below the state count.
    pub fn set_current_state(&mut self, index: usize) -> bool {
        if index >= self.state_ids.len() {
            return false;
        }
        self.current_state = index;
        true
    }

    #[must_use]
    pub const fn current_state(&self) -> usize {
        self.current_state
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Appends a frame. Returns false once the frame list is full.
    pub fn add_frame(&mut self, frame: SpriteFrame) -> bool {
        if self.frames.len() >= MAX_ENTRIES {
            return false;
        }
        self.frames.push(frame);
        true
    }

    /// Removes and returns the frame at `index`.
    pub fn remove_frame(&mut self, index: usize) -> Option<SpriteFrame> {
        if index >= self.frames.len() {
            return None;
        }
        let frame = self.frames.remove(index);
        self.current_frame = self.current_frame.min(self.frames.len().saturating_sub(1));
        Some(frame)
    }

    /// Replaces all frames. An empty list is ignored.
    pub fn set_frames(&mut self, frames: Vec<SpriteFrame>) {
        if frames.is_empty() {
            return;
        }
        self.frames = frames;
        self.current_frame = 0;
    }

    #[must_use]
    pub fn frames(&self) -> &[SpriteFrame] {
        &self.frames
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn set_current_frame(&mut self, index: usize) -> bool {
        if index >= self.frames.len() {
            return false;
        }
        self.current_frame = index;
        true
    }

    #[must_use]
    pub const fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    #[must_use]
    pub fn current_frame(&self) -> Option<&SpriteFrame> {
        self.frames.get(self.current_frame)
    }

    /// Steps to the next frame, wrapping to the first.
    pub fn advance_frame(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.current_frame = (self.current_frame + 1) % self.frames.len();
    }

    /// Steps to the previous frame, wrapping to the last.
    pub fn retreat_frame(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.current_frame = self
            .current_frame
            .checked_sub(1)
            .unwrap_or(self.frames.len() - 1);
    }
}
