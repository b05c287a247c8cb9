use serde::{Deserialize, Serialize};

/// A named scalar exposed on the debug panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweak {
    pub key: String,
    pub label: String,
    value: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Tweak {
    /// `value` is normalised into range like any later `set`.
    pub fn new(key: impl Into<String>, value: f32, min: f32, max: f32, step: f32) -> Self {
        let key = key.into();
        let mut tweak = Self {
            label: key.clone(),
            key,
            value: min,
            min: min.min(max),
            max: max.max(min),
            step: step.abs(),
        };
        tweak.set(value);
        tweak
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Clamp to the range, snap to the step grid, clamp again. Returns true
    /// when the stored value changed. Non-finite input is ignored.
    pub fn set(&mut self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        let mut v = value.clamp(self.min, self.max);
        if self.step > 0.0 {
            v = (v / self.step).round() * self.step;
        }
        v = v.clamp(self.min, self.max);
        let changed = v != self.value;
        self.value = v;
        changed
    }
}

/// The panel's state: visibility plus an ordered list of tweaks.
#[derive(Debug, Clone, Default)]
pub struct DebugPanel {
    visible: bool,
    tweaks: Vec<Tweak>,
}

impl DebugPanel {
    pub fn new(tweaks: Vec<Tweak>) -> Self {
        Self {
            visible: true,
            tweaks,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        tracing::debug!(visible = self.visible, "debug panel toggled");
        self.visible
    }

    pub fn tweaks(&self) -> &[Tweak] {
        &self.tweaks
    }

    pub fn tweak(&self, key: &str) -> Option<&Tweak> {
        self.tweaks.iter().find(|t| t.key == key)
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.tweak(key).map(Tweak::value)
    }

    /// Set a tweak by key. Returns the applied value if it changed.
    pub fn set(&mut self, key: &str, value: f32) -> Option<f32> {
        let tweak = self.tweaks.iter_mut().find(|t| t.key == key)?;
        tweak.set(value).then(|| tweak.value())
    }
}
