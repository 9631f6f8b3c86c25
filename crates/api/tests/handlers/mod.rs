mod auth_test;
mod bookings_test;
mod gallery_test;
mod middleware_test;
mod portal_test;
mod website_test;
