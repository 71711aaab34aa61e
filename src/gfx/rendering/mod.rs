//! Core rendering functionality
//!
//! Handles render pipelines, the glitch post-process and frame rendering.

pub mod pipeline_manager;
pub mod post_process;
pub mod render_engine;

pub use pipeline_manager::{PipelineConfig, PipelineManager, VertexInput};
pub use post_process::{GlitchPass, PassPlan, PostProcessSettings};
pub use render_engine::{DrawList, ObjectUniform, RenderEngine};
