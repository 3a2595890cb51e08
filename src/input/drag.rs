/// Volume change per unit of vertical drag (pixel or terminal row).
pub const DEFAULT_DRAG_SENSITIVITY: f32 = 0.003;

/// Drag-to-adjust master volume.
///
/// Dragging up raises the level: `level = start_level - dy * sensitivity`,
/// clamped to [0, 1]. The gesture is relative to where it began, so the
/// level never jumps on press.
#[derive(Debug, Clone)]
pub struct VolumeDrag {
    sensitivity: f32,
    origin: Option<(f32, f32)>,
}

impl VolumeDrag {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            origin: None,
        }
    }

    pub fn begin(&mut self, y: f32, current_level: f32) {
        self.origin = Some((y, current_level));
    }

    /// New level for pointer position `y`, or `None` when no drag is active.
    pub fn update(&self, y: f32) -> Option<f32> {
        let (start_y, start_level) = self.origin?;
        let dy = y - start_y;
        Some((start_level - dy * self.sensitivity).clamp(0.0, 1.0))
    }

    pub fn end(&mut self) -> bool {
        self.origin.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }
}

impl Default for VolumeDrag {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_SENSITIVITY)
    }
}

/// Level as a whole percentage for display.
pub fn percent(level: f32) -> u8 {
    (level.clamp(0.0, 1.0) * 100.0).round() as u8
}
