//! Login modal flows: mobile OTP, email and social

use std::sync::Arc;
use std::time::Duration;

use storefront::identity::{FacebookAuthResponse, ProviderGrant, ProviderKind};
use storefront::login::{LocalUserRegistry, LoginChannel, LoginOutcome, LoginServices, UserRegistry};
use storefront::models::AuthMethod;
use storefront::testing::{
    MockBackend, MockGraphClient, MockReply, MockScriptFetcher, TestFixtures, TestHarness,
};
use storefront::session::MemoryStore;
use storefront::validation::core::{CONFIRM_PASSWORD_MESSAGE, MOBILE_LENGTH_MESSAGE, OTP_MESSAGE};
use storefront::validation::{EmailForm, EmailMode, Field};
use storefront::{LoginError, LoginModal};

fn email_form(email: &str, password: &str, name: &str) -> EmailForm {
    EmailForm {
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
        full_name: name.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_invalid_phone_never_reaches_backend() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();

    let result = modal.submit_phone("12345").await;
    let Err(LoginError::Validation(errors)) = result else {
        panic!("expected a validation error, got {result:?}");
    };
    assert_eq!(errors.get(Field::Mobile), Some(MOBILE_LENGTH_MESSAGE));
    assert_eq!(harness.backend.otp_request_count(), 0);
    assert!(!modal.view().otp_sent);
}

#[tokio::test(start_paused = true)]
async fn test_existing_account_logs_in_on_fourth_digit() {
    let phone = TestFixtures::default_phone();
    let harness = TestHarness::new(
        MockBackend::new().with_otp_verification(TestFixtures::otp_login_reply(phone)),
    );
    let mut modal = harness.login_modal();

    modal.submit_phone(phone).await.unwrap();
    let view = modal.view();
    assert!(view.otp_sent);
    assert_eq!(view.countdown, 60);
    assert_eq!(view.countdown_label, "01:00");

    for (index, digit) in ["4", "2", "4"].iter().enumerate() {
        assert_eq!(
            modal.input_otp_digit(index, digit).await.unwrap(),
            LoginOutcome::Pending
        );
    }
    assert_eq!(modal.view().otp_focus, 3);
    assert_eq!(harness.backend.otp_verification_count(), 0);

    let LoginOutcome::Success(data) = modal.input_otp_digit(3, "2").await.unwrap() else {
        panic!("expected a login");
    };
    assert_eq!(data.method, AuthMethod::Mobile);
    assert_eq!(data.mobile_number.as_deref(), Some(phone));
    assert!(harness.session.is_logged_in());
    assert_eq!(harness.session.remembered_phone().as_deref(), Some(phone));
    assert_eq!(harness.session.login_timer().as_deref(), Some("false"));

    // The modal resets but keeps the phone prefilled
    let view = modal.view();
    assert!(!view.otp_sent);
    assert_eq!(view.phone_number, phone);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_otp_clears_boxes() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();
    modal.submit_phone(TestFixtures::default_phone()).await.unwrap();

    for (index, digit) in ["9", "9", "9"].iter().enumerate() {
        modal.input_otp_digit(index, digit).await.unwrap();
    }
    let result = modal.input_otp_digit(3, "9").await;
    let Err(LoginError::Validation(errors)) = result else {
        panic!("expected the OTP to be rejected, got {result:?}");
    };
    assert_eq!(errors.get(Field::Otp), Some("Invalid OTP"));

    let view = modal.view();
    assert!(view.otp_sent);
    assert!(view.otp_digits.iter().all(String::is_empty));
    assert_eq!(view.otp_focus, 0);
    assert!(!harness.session.is_logged_in());
}

#[tokio::test(start_paused = true)]
async fn test_incomplete_otp_is_not_sent() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();
    modal.submit_phone(TestFixtures::default_phone()).await.unwrap();
    modal.input_otp_digit(0, "1").await.unwrap();
    assert_eq!(modal.input_otp_digit(1, "x").await.unwrap(), LoginOutcome::Pending);

    let Err(LoginError::Validation(errors)) = modal.verify_otp().await else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.get(Field::Otp), Some(OTP_MESSAGE));
    assert_eq!(harness.backend.otp_verification_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_otp_backspace_moves_focus_back() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();
    assert!(matches!(
        modal.otp_backspace(1),
        Err(LoginError::WrongState { .. })
    ));

    modal.submit_phone(TestFixtures::default_phone()).await.unwrap();
    modal.input_otp_digit(0, "5").await.unwrap();
    modal.input_otp_digit(1, "6").await.unwrap();
    modal.input_otp_digit(1, "").await.unwrap();
    modal.otp_backspace(1).unwrap();

    let view = modal.view();
    assert_eq!(view.otp_focus, 0);
    assert_eq!(view.otp_digits, vec!["", "", "", ""]);
}

#[tokio::test(start_paused = true)]
async fn test_resend_waits_for_countdown() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();
    modal.submit_phone(TestFixtures::default_phone()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(modal.view().countdown, 50);
    assert!(!modal.view().can_resend);
    assert_eq!(modal.resend_otp().await.unwrap(), LoginOutcome::Pending);
    assert_eq!(harness.backend.otp_request_count(), 1);

    tokio::time::sleep(Duration::from_secs(51)).await;
    assert_eq!(modal.view().countdown, 0);
    assert!(modal.view().can_resend);
    modal.resend_otp().await.unwrap();
    assert_eq!(harness.backend.otp_request_count(), 2);
    assert_eq!(modal.view().countdown, 60);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_resend_keeps_countdown_at_zero() {
    let harness = TestHarness::new(
        MockBackend::new()
            .with_otp_request(MockReply::status(200, "OTP sent"))
            .with_otp_request(MockReply::status(500, "SMS gateway down")),
    );
    let mut modal = harness.login_modal();
    modal.submit_phone(TestFixtures::default_phone()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(matches!(modal.resend_otp().await, Err(LoginError::Rejected(_))));
    assert!(modal.view().can_resend);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_phone_hands_over_to_account_creation() {
    let phone = TestFixtures::default_phone();
    let harness = TestHarness::new(
        MockBackend::new().with_otp_verification(TestFixtures::otp_new_account_reply(phone)),
    );
    let mut modal = harness.login_modal();
    modal.submit_phone(phone).await.unwrap();
    for (index, digit) in ["1", "2", "3"].iter().enumerate() {
        modal.input_otp_digit(index, digit).await.unwrap();
    }

    let LoginOutcome::NewAccount { phone_number, .. } =
        modal.input_otp_digit(3, "4").await.unwrap()
    else {
        panic!("expected account creation");
    };
    assert_eq!(phone_number, phone);
    assert!(modal.view().awaiting_account);
    assert!(!harness.session.is_logged_in());

    let LoginOutcome::Success(data) = modal
        .account_created(TestFixtures::mobile_user(phone))
        .unwrap()
    else {
        panic!("expected a login");
    };
    assert!(data.is_new_user);
    assert!(harness.session.is_logged_in());
    assert!(matches!(
        modal.account_created(TestFixtures::mobile_user(phone)),
        Err(LoginError::WrongState { .. })
    ));
}

#[tokio::test]
async fn test_email_signup_then_login() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();
    modal.select_channel(LoginChannel::Email);

    let form = email_form("asha@example.com", "secret1", "Asha Rao");
    let result = modal.submit_email(form.clone()).await;
    assert!(matches!(result, Err(LoginError::Rejected(_))));
    assert_eq!(modal.view().email_mode, EmailMode::Signup);

    let LoginOutcome::Success(created) = modal.submit_email(form.clone()).await.unwrap() else {
        panic!("expected a signup");
    };
    assert!(created.is_new_user);
    assert_eq!(created.method, AuthMethod::Email);
    assert_eq!(created.email.as_deref(), Some("asha@example.com"));

    harness.session.clear_user_session().unwrap();
    modal.select_channel(LoginChannel::Email);
    let LoginOutcome::Success(logged_in) = modal.submit_email(form).await.unwrap() else {
        panic!("expected a login");
    };
    assert!(!logged_in.is_new_user);
    assert_eq!(logged_in.user_data.id, created.user_data.id);
}

#[tokio::test]
async fn test_switching_method_clears_errors_and_abandoned_fields() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();

    modal.submit_phone(TestFixtures::default_phone()).await.unwrap();
    modal.input_otp_digit(0, "1").await.unwrap();
    assert!(modal.verify_otp().await.is_err());
    assert!(!modal.errors().is_empty());

    modal.select_channel(LoginChannel::Email);
    let view = modal.view();
    assert_eq!(view.channel, LoginChannel::Email);
    assert!(view.errors.is_empty());
    assert!(modal.notice().is_none());

    let form = email_form("asha@", "secret1", "Asha Rao");
    assert!(modal.submit_email(form).await.is_err());
    assert!(!modal.errors().is_empty());

    modal.select_channel(LoginChannel::Mobile);
    let view = modal.view();
    assert!(view.errors.is_empty());
    assert_eq!(view.phone_number, "");
    assert!(!view.otp_sent);
    assert!(view.otp_digits.iter().all(String::is_empty));

    modal.select_channel(LoginChannel::Email);
    let view = modal.view();
    assert_eq!(view.email, "");
    assert_eq!(view.email_mode, EmailMode::Login);
}

#[tokio::test]
async fn test_signup_password_mismatch_creates_no_account() {
    let harness = TestHarness::new(MockBackend::new());
    let registry = Arc::new(LocalUserRegistry::new(Arc::new(MemoryStore::new())));
    let services = LoginServices {
        registry: registry.clone(),
        ..harness.services()
    };
    let mut modal = LoginModal::new(
        Arc::clone(&harness.session),
        services,
        TestFixtures::login_options(),
    );
    modal.toggle_email_mode();
    assert_eq!(modal.view().email_mode, EmailMode::Signup);

    let mut form = email_form("asha@example.com", "abc123", "Asha Rao");
    form.confirm_password = "abc124".to_string();
    let Err(LoginError::Validation(errors)) = modal.submit_email(form).await else {
        panic!("expected a validation error");
    };

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(Field::ConfirmPassword), Some(CONFIRM_PASSWORD_MESSAGE));
    assert!(registry.find_by_email("asha@example.com").unwrap().is_none());
    assert!(!harness.session.is_logged_in());
}

#[tokio::test]
async fn test_email_form_errors_are_reported_together() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();
    modal.toggle_email_mode();

    let mut form = email_form("asha@", "123", "A");
    form.confirm_password = "456".to_string();
    let Err(LoginError::Validation(errors)) = modal.submit_email(form).await else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 4);
    assert_eq!(modal.view().errors, errors);
}

#[tokio::test]
async fn test_google_falls_back_to_token_decode() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();
    let credential = TestFixtures::google_id_token(
        "1089",
        "Asha Rao",
        "asha@example.com",
        "https://lh3.example/asha.png",
    );

    let LoginOutcome::Success(data) = modal
        .social_login(ProviderKind::Google, ProviderGrant::Google { credential })
        .await
        .unwrap()
    else {
        panic!("expected a login");
    };
    assert_eq!(harness.backend.google_login_count(), 1);
    assert_eq!(data.method, AuthMethod::Google);
    assert_eq!(data.user_data.id, "google_1089");
    assert_eq!(data.user_data.email(), "asha@example.com");
    assert_eq!(data.user_data.data.google_id.as_deref(), Some("1089"));
}

#[tokio::test]
async fn test_google_backend_verification_wins() {
    let backend_user = serde_json::json!({
        "_id": "665f0c",
        "userId": "665f0c",
        "data": {
            "personalInfo": { "name": "Asha Rao", "email": "asha@example.com", "phone": null },
            "authMethod": "google"
        }
    });
    let harness = TestHarness::new(MockBackend::new().with_google_login(MockReply::with_data(
        200,
        "Login successful",
        backend_user,
    )));
    let mut modal = harness.login_modal();
    let credential = TestFixtures::google_id_token("1089", "Asha Rao", "asha@example.com", "");

    let LoginOutcome::Success(data) = modal
        .social_login(ProviderKind::Google, ProviderGrant::Google { credential })
        .await
        .unwrap()
    else {
        panic!("expected a login");
    };
    assert_eq!(data.user_data.id, "665f0c");
    assert_eq!(modal.view().notice.map(|n| n.message).as_deref(), Some("Login successful"));
}

#[tokio::test]
async fn test_facebook_login_reads_graph_profile() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();
    let grant = ProviderGrant::Facebook {
        auth_response: Some(FacebookAuthResponse {
            user_id: "10158".to_string(),
            access_token: "EAAB-token".to_string(),
        }),
    };

    let LoginOutcome::Success(data) = modal
        .social_login(ProviderKind::Facebook, grant)
        .await
        .unwrap()
    else {
        panic!("expected a login");
    };
    assert_eq!(harness.graph.call_count(), 1);
    assert_eq!(data.user_data.id, "facebook_10158");
    assert_eq!(data.user_data.name(), "Facebook User");
    assert_eq!(
        data.user_data.data.personal_info.photo,
        "https://graph.example/picture.jpg"
    );
}

#[tokio::test]
async fn test_facebook_cancel_and_popup_block_are_humanized() {
    let harness = TestHarness::new(MockBackend::new());
    let mut modal = harness.login_modal();

    let cancelled = modal
        .social_login(ProviderKind::Facebook, ProviderGrant::Facebook { auth_response: None })
        .await;
    let Err(LoginError::Rejected(message)) = cancelled else {
        panic!("expected a rejection");
    };
    assert_eq!(message, "Authentication was cancelled.");

    let blocked = modal
        .social_login(
            ProviderKind::Google,
            ProviderGrant::Failed {
                error: "popup_blocked".to_string(),
            },
        )
        .await;
    let Err(LoginError::Rejected(message)) = blocked else {
        panic!("expected a rejection");
    };
    assert_eq!(message, "Popup was blocked. Please allow popups and try again.");
    assert!(!harness.session.is_logged_in());
}

#[tokio::test]
async fn test_failed_sdk_load_is_retried() {
    let mut harness = TestHarness::new(MockBackend::new());
    harness.fetcher = Arc::new(MockScriptFetcher::failing(1));
    let mut modal = harness.login_modal();
    let grant = || ProviderGrant::Facebook {
        auth_response: Some(FacebookAuthResponse {
            user_id: "10158".to_string(),
            access_token: "EAAB-token".to_string(),
        }),
    };

    let Err(LoginError::Rejected(message)) =
        modal.social_login(ProviderKind::Facebook, grant()).await
    else {
        panic!("expected the first load to fail");
    };
    assert_eq!(message, "Network error. Please check your connection and try again.");

    assert!(modal.social_login(ProviderKind::Facebook, grant()).await.is_ok());
    assert_eq!(harness.fetcher.fetch_count(), 2);

    // Loaded once; later logins reuse the script
    assert!(modal.social_login(ProviderKind::Facebook, grant()).await.is_ok());
    assert_eq!(harness.fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn test_graph_failure_is_a_network_error() {
    let mut harness = TestHarness::new(MockBackend::new());
    harness.graph = Arc::new(MockGraphClient::failing());
    let mut modal = harness.login_modal();
    let result = modal
        .social_login(
            ProviderKind::Facebook,
            ProviderGrant::Facebook {
                auth_response: Some(FacebookAuthResponse {
                    user_id: "10158".to_string(),
                    access_token: "EAAB-token".to_string(),
                }),
            },
        )
        .await;
    assert!(matches!(result, Err(LoginError::Rejected(_))));
    assert!(!harness.session.is_logged_in());
}
