use crate::education::{CountyId, EducationRecord};

/// Tooltip opacity while a county is hovered.
pub const TOOLTIP_VISIBLE_OPACITY: f64 = 0.8;
/// Opacity of the hovered county shape.
pub const DIMMED_SHAPE_OPACITY: f64 = 0.2;
/// Tooltip offset from the pointer, in both axes.
pub const POINTER_OFFSET: f64 = 10.0;
/// Where the hidden tooltip is parked so it never intercepts the pointer.
pub const OFFSCREEN: f64 = -1000.0;

/// Text shown for a county, or a "no data" line when the join missed.
pub fn tooltip_text(id: CountyId, record: Option<&EducationRecord>) -> String {
    match record {
        Some(r) => format!("{}, {}: {}%", r.area_name, r.state, r.bachelors_or_higher),
        None => format!("{id}: no data"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipState {
    pub opacity: f64,
    pub left: f64,
    pub top: f64,
    pub text: String,
    /// Statistic of the hovered county, exposed on the tooltip element.
    pub education: Option<f64>,
}

impl Default for TooltipState {
    fn default() -> Self {
        Self {
            opacity: 0.0,
            left: OFFSCREEN,
            top: OFFSCREEN,
            text: String::new(),
            education: None,
        }
    }
}

impl TooltipState {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Hover state machine shared by every county shape.
///
/// Only one shape can be hovered at a time; entering a new shape implicitly
/// releases the previous one, and a leave event for a shape that is no longer
/// hovered is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverState {
    tooltip: TooltipState,
    hovered: Option<CountyId>,
}

impl HoverState {
    pub fn enter(&mut self, id: CountyId, record: Option<&EducationRecord>, pointer: (f64, f64)) {
        self.hovered = Some(id);
        self.tooltip.text = tooltip_text(id, record);
        self.tooltip.education = record.map(|r| r.bachelors_or_higher);
        self.tooltip.opacity = TOOLTIP_VISIBLE_OPACITY;
        self.place(pointer);
    }

    /// Follow the pointer. Ignored while nothing is hovered.
    pub fn move_to(&mut self, pointer: (f64, f64)) {
        if self.hovered.is_some() {
            self.place(pointer);
        }
    }

    pub fn exit(&mut self, id: CountyId) {
        if self.hovered != Some(id) {
            return;
        }
        self.hovered = None;
        self.tooltip = TooltipState::default();
    }

    fn place(&mut self, (x, y): (f64, f64)) {
        self.tooltip.left = x + POINTER_OFFSET;
        self.tooltip.top = y + POINTER_OFFSET;
    }

    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    pub fn hovered(&self) -> Option<CountyId> {
        self.hovered
    }

    pub fn shape_opacity(&self, id: CountyId) -> f64 {
        shape_opacity(self.hovered, id)
    }
}

/// Opacity for shape `id` given the currently hovered county.
pub fn shape_opacity(hovered: Option<CountyId>, id: CountyId) -> f64 {
    if hovered == Some(id) {
        DIMMED_SHAPE_OPACITY
    } else {
        1.0
    }
}
