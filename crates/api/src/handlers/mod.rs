pub mod amendments;
pub mod availability;
pub mod bookings;
pub mod engagements;
pub mod requests;
