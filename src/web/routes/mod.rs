pub mod admin;
pub mod admin_donations;
pub mod admin_events;
pub mod admin_subscribers;
pub mod admin_surveys;
pub mod auth;
pub mod donate;
pub mod events;
pub mod pages;
pub mod registration;
pub mod subscribe;
pub mod surveys;
