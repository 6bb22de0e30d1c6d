/// Derives the original track's gain from the number of sounding dub sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuckingController {
    base_volume: f32,
    duck_factor: f32,
}

impl DuckingController {
    pub fn new(base_volume: f32, duck_factor: f32) -> Self {
        Self { base_volume, duck_factor }
    }

    pub fn base_volume(&self) -> f32 {
        self.base_volume
    }

    pub fn set_base_volume(&mut self, volume: f32) {
        self.base_volume = volume.clamp(0.0, 1.0);
    }

    /// Must be re-evaluated on every add and every removal, natural completion included.
    pub fn gain_for(&self, active_sources: usize) -> f32 {
        if active_sources == 0 {
            self.base_volume
        } else {
            self.base_volume * self.duck_factor
        }
    }
}
