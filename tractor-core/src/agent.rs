//! Action selection and the bootstrapped update of the learned model.
//!
//! [`TractorAgent`] owns everything that changes while a run progresses: the
//! model, the exploration rate and the steering-hold state. It is passed
//! explicitly to the [`EpisodeController`](crate::EpisodeController) and the
//! [`Evaluator`](crate::Evaluator), so several independent runs can coexist
//! in one process.
mod base;
mod config;
mod explorer;
mod steering;
pub use base::TractorAgent;
pub use config::{AgentConfig, PolicyConfig, TargetStrategy};
pub use explorer::{EpsilonGreedy, ExplorationConfig};
pub use steering::{ConsecutiveSteering, SteeringConfig};
