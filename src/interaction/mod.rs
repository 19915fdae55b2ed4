use serde::{Deserialize, Serialize};

/// What a pointer drag selects once it is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    /// Rectangular zoom on both axes.
    ZoomXY,
    /// Zoom on X only; Y spans the full plot height.
    ZoomX,
    /// Zoom on Y only; X spans the full plot width.
    ZoomY,
    /// X range reported to the marker callback.
    Marker,
}

impl BrushKind {
    #[must_use]
    pub fn brushes_x(self) -> bool {
        !matches!(self, Self::ZoomY)
    }

    #[must_use]
    pub fn brushes_y(self) -> bool {
        matches!(self, Self::ZoomXY | Self::ZoomY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    Idle,
    /// A brush is armed and waits for the pointer to go down.
    Armed(BrushKind),
    Brushing(BrushKind),
}

/// Active drag in inner plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushState {
    pub kind: BrushKind,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub current_x: f64,
    pub current_y: f64,
}

impl BrushState {
    /// Brushed X interval, `[x, x + 1]` when the drag has no width.
    #[must_use]
    pub fn x_extent(self) -> (f64, f64) {
        ordered_or_unit(self.anchor_x, self.current_x)
    }

    /// Brushed Y interval, `[y, y + 1]` when the drag has no height.
    #[must_use]
    pub fn y_extent(self) -> (f64, f64) {
        ordered_or_unit(self.anchor_y, self.current_y)
    }

    #[must_use]
    pub fn has_area(self) -> bool {
        self.anchor_x != self.current_x && self.anchor_y != self.current_y
    }
}

fn ordered_or_unit(a: f64, b: f64) -> (f64, f64) {
    if a == b {
        (a, a + 1.0)
    } else {
        (a.min(b), a.max(b))
    }
}

/// Hover ruler exposed to host applications.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulerState {
    pub visible: bool,
    /// Pointer X in inner plot coordinates.
    pub x: f64,
    /// Domain readout, `None` over a categorical X scale.
    pub value: Option<f64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    mode: InteractionMode,
    brush: Option<BrushState>,
    cursor_x: f64,
    cursor_y: f64,
    ruler: RulerState,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Idle,
            brush: None,
            cursor_x: 0.0,
            cursor_y: 0.0,
            ruler: RulerState::default(),
        }
    }
}

impl InteractionState {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn brush(&self) -> Option<BrushState> {
        self.brush
    }

    #[must_use]
    pub fn cursor(&self) -> (f64, f64) {
        (self.cursor_x, self.cursor_y)
    }

    #[must_use]
    pub fn ruler(&self) -> &RulerState {
        &self.ruler
    }

    pub fn arm(&mut self, kind: BrushKind) {
        self.brush = None;
        self.mode = InteractionMode::Armed(kind);
    }

    /// Starts the armed brush at `(x, y)`. Returns false when nothing is armed.
    pub fn begin_brush(&mut self, x: f64, y: f64) -> bool {
        let InteractionMode::Armed(kind) = self.mode else {
            return false;
        };
        self.brush = Some(BrushState {
            kind,
            anchor_x: x,
            anchor_y: y,
            current_x: x,
            current_y: y,
        });
        self.mode = InteractionMode::Brushing(kind);
        true
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.cursor_x = x;
        self.cursor_y = y;
        if let Some(brush) = self.brush.as_mut() {
            brush.current_x = x;
            brush.current_y = y;
        }
    }

    /// Ends the drag and hands back the final brush.
    pub fn finish_brush(&mut self) -> Option<BrushState> {
        self.mode = InteractionMode::Idle;
        self.brush.take()
    }

    pub fn cancel(&mut self) {
        self.mode = InteractionMode::Idle;
        self.brush = None;
    }

    pub fn show_ruler(&mut self, x: f64, value: Option<f64>, label: Option<String>) {
        self.ruler = RulerState {
            visible: true,
            x,
            value,
            label,
        };
    }

    pub fn hide_ruler(&mut self) {
        self.ruler.visible = false;
    }
}
