//! Application use cases / business logic

pub mod aggregate;
pub mod compose;
pub mod images;
pub mod pipeline;

pub use aggregate::{TOP_N, aggregate};
pub use compose::{ComposeConfig, ComposeUseCase};
pub use images::ImageResolver;
pub use pipeline::{DigestPipeline, PipelineError};
