pub mod booking;
pub mod client;
pub mod deletion;
pub mod image;
pub mod website;
