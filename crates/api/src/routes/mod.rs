pub mod auth;
pub mod bookings;
pub mod clients;
pub mod dashboard;
pub mod gallery;
pub mod health;
pub mod portal;
pub mod website;
