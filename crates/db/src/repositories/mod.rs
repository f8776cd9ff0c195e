pub mod amendment_repo;
pub mod booking_attempt_repo;
pub mod engagement_repo;
pub mod mentor_request_repo;
pub mod participant_repo;

pub use amendment_repo::AmendmentRepo;
pub use booking_attempt_repo::BookingAttemptRepo;
pub use engagement_repo::{EngagementRepo, FinalizeOutcome};
pub use mentor_request_repo::MentorRequestRepo;
pub use participant_repo::{MentorRepo, UserRepo};
