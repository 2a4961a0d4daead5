mod notifications;
mod rates;
mod realtime;

pub use notifications::Notifier;
pub use rates::RatesCache;
pub use realtime::{MessageEvent, RealtimeHub, Subscription};
