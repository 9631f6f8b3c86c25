pub mod booking;
pub mod client;
pub mod gallery;
pub mod website;
