pub mod donations;
pub mod email_logs;
pub mod events;
pub mod pages;
pub mod registrations;
pub mod subscribers;
pub mod surveys;

pub use donations::DonorRow;
pub use email_logs::EmailLogRow;
pub use events::{CustomField, EventRow};
pub use pages::PageRow;
pub use registrations::{RegistrationChildRow, RegistrationRow};
pub use subscribers::SubscriberRow;
pub use surveys::{SurveyQuestion, SurveyResponseRow, SurveyRow};
