pub mod error;
pub mod notify;
pub mod pages;
pub mod pipeline;
pub mod repo;
pub mod safety;
pub mod state_machine;
pub mod store;

pub use error::{PipelineError, Result};
pub use notify::{NotificationDispatcher, Notifier};
pub use pages::PagesPublisher;
pub use pipeline::TaskOrchestrator;
pub use repo::RepositoryManager;
pub use safety::{LengthRatioPolicy, SafetyPolicy, SafetyVerdict};
pub use state_machine::PipelineStateMachine;
pub use store::{StoreSnapshot, TaskStore};
