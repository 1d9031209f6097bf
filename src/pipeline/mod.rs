//! End-to-end rendering pipeline.

mod engine;

pub use engine::RenderEngine;
