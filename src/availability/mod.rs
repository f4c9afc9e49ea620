//! The availability-resolution pipeline: status resolution, caching,
//! per-server orchestration and request submission.

pub mod cache;
mod identity;
mod orchestrator;
mod status;
mod submit;

pub use cache::{AvailabilityCache, CacheKey, CachedAvailability};
pub use identity::MovieIdentity;
pub use orchestrator::{AvailabilityReport, Orchestrator, ResolveOutcome, ServerAvailability};
pub use status::{Status, resolve_status};
pub use submit::{RequestSubmitter, SubmitAck};
