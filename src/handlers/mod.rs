// HTTP request handlers for the storefront BFF
pub mod auth;
pub mod booking;
pub mod helpers;
pub mod login;
pub mod products;
pub mod state;

pub use auth::{health, logout, session_status};
pub use helpers::ApiError;
pub use state::{spawn_visitor_sweeper, AppState, Visitor, VisitorHandle};

use actix_web::web;

/// Register every storefront route
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg
        // Health and session
        .route("/ping", web::get().to(health))
        .route("/auth/session", web::get().to(session_status))
        .route("/auth/logout", web::post().to(logout))
        // Product listing
        .route("/products", web::get().to(products::list_products))
        .route("/products/filters", web::post().to(products::update_filters))
        .route("/products/price-range", web::post().to(products::update_price_range))
        .route("/products/sort", web::post().to(products::update_sort))
        // Booking wizard
        .route("/booking", web::get().to(booking::booking_state))
        .route("/booking/time-slots", web::get().to(booking::time_slots))
        .route("/booking/open", web::post().to(booking::open_booking))
        .route("/booking/date", web::post().to(booking::select_date))
        .route("/booking/time", web::post().to(booking::select_time))
        .route("/booking/customizations", web::post().to(booking::confirm_customizations))
        .route("/booking/back", web::post().to(booking::back))
        .route("/booking/close", web::post().to(booking::close))
        .route("/booking/edit/{step}", web::post().to(booking::edit_step))
        // Login modal
        .route("/login/method", web::post().to(login::select_method))
        .route("/login/mobile", web::post().to(login::submit_phone))
        .route("/login/otp/digit", web::post().to(login::otp_digit))
        .route("/login/otp/backspace", web::post().to(login::otp_backspace))
        .route("/login/otp/verify", web::post().to(login::verify_otp))
        .route("/login/otp/resend", web::post().to(login::resend_otp))
        .route("/login/email", web::post().to(login::submit_email))
        .route("/login/email/toggle", web::post().to(login::toggle_email_mode))
        .route("/login/social/{provider}", web::post().to(login::social_login))
        .route("/login/account-created", web::post().to(login::account_created));
}

/// Route table printed at startup
pub const ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/ping", "Health check"),
    ("GET", "/auth/session", "Current login state"),
    ("POST", "/auth/logout", "Clear the stored session"),
    ("GET", "/products", "Product listing (filters as query)"),
    ("POST", "/products/filters", "Change category, city, same-day or discount"),
    ("POST", "/products/price-range", "Debounced price slider change"),
    ("POST", "/products/sort", "Re-order the listing"),
    ("GET", "/booking", "Booking wizard state"),
    ("GET", "/booking/time-slots", "Available delivery windows"),
    ("POST", "/booking/open", "Start a booking for a product"),
    ("POST", "/booking/date", "Step 1: pick a date"),
    ("POST", "/booking/time", "Step 2: pick a time slot"),
    ("POST", "/booking/customizations", "Step 3: confirm add-ons"),
    ("POST", "/booking/back", "Previous step"),
    ("POST", "/booking/close", "Discard the booking"),
    ("POST", "/booking/edit/{step}", "Jump back from login"),
    ("POST", "/login/method", "Mobile, email or social"),
    ("POST", "/login/mobile", "Request an OTP"),
    ("POST", "/login/otp/digit", "Type one OTP digit"),
    ("POST", "/login/otp/backspace", "OTP backspace"),
    ("POST", "/login/otp/verify", "Verify the OTP"),
    ("POST", "/login/otp/resend", "Resend the OTP"),
    ("POST", "/login/email", "Email login or signup"),
    ("POST", "/login/email/toggle", "Switch login and signup"),
    ("POST", "/login/social/{provider}", "Google or Facebook grant"),
    ("POST", "/login/account-created", "Finish a new mobile account"),
];
