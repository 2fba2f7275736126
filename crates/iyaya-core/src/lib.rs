pub mod error;
pub mod model;

pub use error::{ErrorKind, Result, ServiceError};
pub use model::{
    Application, AuthSession, Booking, BookingPage, Caregiver, CaregiverPage, Child, Conversation,
    Job, JobPage, Message, Notification, PrivacyRequest, PrivacySettings, Rating, RatingSummary,
    UserProfile, UserRole,
};
