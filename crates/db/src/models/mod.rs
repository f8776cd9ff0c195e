pub mod amendment;
pub mod booking_attempt;
pub mod engagement;
pub mod mentor_request;
pub mod participant;
