pub mod bookings;
pub mod contacts;
