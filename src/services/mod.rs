pub mod dashboard_service;
pub mod donation_service;
pub mod event_service;
pub mod export_service;
pub mod mailer_service;
pub mod registration_service;
pub mod subscriber_service;
pub mod survey_service;
