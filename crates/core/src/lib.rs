pub mod callback;
pub mod domain;
pub mod error;

pub use callback::CallbackPayload;
pub use domain::generation::{GeneratedFile, GenerationResult, ENTRY_FILE, LICENSE_FILE, README_FILE};
pub use domain::task::{Attachment, DeploymentResult, TaskRecord, TaskRequest, TaskStatus};
pub use error::CoreError;
