use std::collections::HashMap;

use orrery_core::{BodyCatalog, BodyId, BodyRecord};

/// How a body is drawn. Never read by the orbit math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayState {
    /// 0xRRGGBB.
    pub color: u32,
    /// Marker radius in display units.
    pub size: f32,
    pub visible: bool,
    pub label_visible: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            size: 1.0,
            visible: true,
            label_visible: true,
        }
    }
}

impl DisplayState {
    /// Floats per body in the display buffer.
    pub const FLOATS: usize = 4;

    /// `[r, g, b, size]` with channels in `0.0..=1.0`.
    pub fn to_floats(&self) -> [f32; Self::FLOATS] {
        let channel = |shift: u32| ((self.color >> shift) & 0xff) as f32 / 255.0;
        [channel(16), channel(8), channel(0), self.size]
    }
}

/// Per-body display state plus the global hazardous-only filter.
#[derive(Debug, Clone, Default)]
pub struct DisplayRegistry {
    states: HashMap<BodyId, DisplayState>,
    pha_only: bool,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display state for `id`; bodies never touched get the default.
    pub fn get(&self, id: BodyId) -> DisplayState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    fn entry(&mut self, id: BodyId) -> &mut DisplayState {
        self.states.entry(id).or_default()
    }

    pub fn set_color(&mut self, id: BodyId, color: u32) {
        self.entry(id).color = color;
    }

    pub fn set_size(&mut self, id: BodyId, size: f32) {
        self.entry(id).size = size;
    }

    pub fn set_visible(&mut self, id: BodyId, visible: bool) {
        self.entry(id).visible = visible;
    }

    pub fn set_label_visible(&mut self, id: BodyId, visible: bool) {
        self.entry(id).label_visible = visible;
    }

    /// Show or hide every label at once.
    pub fn set_all_labels_visible(&mut self, catalog: &BodyCatalog, visible: bool) {
        for body in catalog {
            self.set_label_visible(body.id, visible);
        }
    }

    pub fn set_pha_only(&mut self, pha_only: bool) {
        self.pha_only = pha_only;
    }

    pub fn pha_only(&self) -> bool {
        self.pha_only
    }

    /// Effective visibility after the hazardous-only filter.
    pub fn is_visible(&self, body: &BodyRecord) -> bool {
        self.get(body.id).visible && (!self.pha_only || body.potentially_hazardous)
    }

    /// Label shows only when its body does.
    pub fn is_label_visible(&self, body: &BodyRecord) -> bool {
        self.is_visible(body) && self.get(body.id).label_visible
    }

    /// Drop state for bodies no longer in `catalog`.
    pub fn retain_catalog(&mut self, catalog: &BodyCatalog) {
        self.states.retain(|id, _| catalog.get(*id).is_some());
    }

    /// One byte per body in catalog order: bit 0 body visible, bit 1 label visible.
    pub fn visibility_flags(&self, catalog: &BodyCatalog) -> Vec<u8> {
        let mut flags = Vec::with_capacity(catalog.len());
        self.write_visibility_flags(catalog, &mut flags);
        flags
    }

    /// [`DisplayRegistry::visibility_flags`] into an existing buffer.
    pub fn write_visibility_flags(&self, catalog: &BodyCatalog, out: &mut Vec<u8>) {
        out.clear();
        out.extend(
            catalog
                .iter()
                .map(|body| self.is_visible(body) as u8 | (self.is_label_visible(body) as u8) << 1),
        );
    }

    /// [`DisplayState::to_floats`] per body in catalog order, into an existing buffer.
    pub fn write_display_floats(&self, catalog: &BodyCatalog, out: &mut Vec<f32>) {
        out.clear();
        out.extend(catalog.iter().flat_map(|body| self.get(body.id).to_floats()));
    }
}
