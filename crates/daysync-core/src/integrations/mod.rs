pub mod google;
pub mod oauth;

pub use google::GoogleCalendar;
pub use oauth::{ClientSecrets, CredentialManager, Credentials};
