//! Finder dialog: the conversational flow around the ranker.
//!
//! A turn either continues an active finder dialog (collect location, offer a
//! shortlist, take a selection) or is routed by intent. Dialog progress and
//! the user profile live in the [`StateStore`](crate::store::StateStore).

pub mod activity;
pub mod bot;
pub mod prompts;
pub mod state;

pub use activity::{Activity, ActivityKind};
pub use bot::ClinicBot;
pub use state::{FinderPhase, FinderPurpose, FinderState, Shortlisted, UserProfile};
