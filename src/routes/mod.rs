pub mod estimates;
pub mod health;
pub mod inbox;
pub mod inquiries;
pub mod messages;
pub mod notifications;
pub mod rates;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .route("/rates", get(rates::get_rates))
        .route("/estimates/compute", post(estimates::compute_estimate))
        // Inquiries
        .route("/inquiries", post(inquiries::submit_inquiry))
        .route("/inquiries", get(inquiries::list_inquiries))
        .route("/inquiries/mine", get(inquiries::list_my_inquiries))
        .route("/inquiries/:inquiry_id", get(inquiries::get_inquiry))
        .route("/inquiries/:inquiry_id", put(inquiries::update_inquiry))
        .route("/inquiries/:inquiry_id", delete(inquiries::delete_inquiry))
        // Lifecycle transitions
        .route(
            "/inquiries/:inquiry_id/accept",
            put(inquiries::accept_inquiry),
        )
        .route(
            "/inquiries/:inquiry_id/complete",
            put(inquiries::complete_inquiry),
        )
        .route(
            "/inquiries/:inquiry_id/cancel",
            put(inquiries::cancel_inquiry),
        )
        // Messaging channel
        .route(
            "/inquiries/:inquiry_id/messages",
            get(messages::list_messages),
        )
        .route(
            "/inquiries/:inquiry_id/messages",
            post(messages::post_message),
        )
        .route(
            "/inquiries/:inquiry_id/messages/stream",
            get(messages::stream_messages),
        )
        // Inbox
        .route("/inbox", get(inbox::get_inbox))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read", put(notifications::mark_read))
}
