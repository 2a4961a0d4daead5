pub mod estimate;
pub mod inquiry;
pub mod messages;
pub mod notifications;
pub mod rates;
