//! The compositing layer chain.
//!
//! Layers paint into the shared frame in a fixed order: starfield at the
//! back, waveform trail, cover and rings, text on top. Disabling a layer
//! removes it from the chain without changing the order of the rest.

mod cover;
mod starfield;
mod text;
mod waveform;

pub use cover::CoverRingLayer;
pub use starfield::StarfieldLayer;
pub use text::TextLayer;
pub use waveform::WaveformLayer;

use crate::audio::FeatureSample;
use crate::error::Result;
use crate::render::frame::Frame;
use crate::render::scene::SceneState;
use crate::render::RenderConfig;

/// A single compositing layer
///
/// Renderers are stateless: everything that changes over time lives in
/// the [`SceneState`] or the current [`FeatureSample`].
pub trait LayerRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(
        &self,
        frame: &mut Frame,
        scene: &SceneState,
        sample: &FeatureSample,
        config: &RenderConfig,
    ) -> Result<()>;
}

/// Build the layer chain for a resolved configuration, back to front
pub fn build_chain(config: &RenderConfig) -> Vec<Box<dyn LayerRenderer>> {
    let mut chain: Vec<Box<dyn LayerRenderer>> = Vec::with_capacity(4);

    if config.starfield_enabled {
        chain.push(Box::new(StarfieldLayer));
    }
    chain.push(Box::new(WaveformLayer));
    if config.cover.is_some() || config.rings_enabled {
        chain.push(Box::new(CoverRingLayer));
    }
    if config.text.is_some() && config.font.is_some() {
        chain.push(Box::new(TextLayer));
    }

    chain
}
