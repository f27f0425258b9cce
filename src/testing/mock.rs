//! Mock collaborators for isolated tests
//!
//! Each mock records how often it was called so tests can assert that a
//! request was, or was not, sent.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::backend::{BackendClient, BackendError};
use crate::booking::CompletionSink;
use crate::identity::{FacebookPicture, FacebookPictureData, FacebookProfile, GraphClient, ScriptFetcher};
use crate::models::{ApiEnvelope, BookingCompletion, ProductQuery};

/// One scripted backend answer
#[derive(Debug, Clone)]
pub enum MockReply {
    Envelope(ApiEnvelope),
    /// The request never produced an envelope
    Failure,
}

impl MockReply {
    #[must_use]
    pub fn status(status: u16, message: &str) -> Self {
        Self::Envelope(ApiEnvelope::new(status, message, Value::Null))
    }

    #[must_use]
    pub fn with_data(status: u16, message: &str, data: Value) -> Self {
        Self::Envelope(ApiEnvelope::new(status, message, data))
    }

    fn into_result(self) -> Result<ApiEnvelope, BackendError> {
        match self {
            Self::Envelope(envelope) => Ok(envelope),
            Self::Failure => Err(BackendError::Decode("mock backend failure".to_string())),
        }
    }
}

/// A request the mock backend received
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    RequestOtp { phone: String },
    VerifyOtp { phone: String, otp: u32 },
    GoogleLogin { id_token: String },
    CategoryProducts(ProductQuery),
}

/// Backend with per-endpoint reply queues
///
/// When a queue runs dry the endpoint falls back to a neutral default: OTP
/// requests succeed, OTP verification rejects, Google login rejects and
/// product lists are empty.
#[derive(Debug, Default)]
pub struct MockBackend {
    otp_requests: Mutex<VecDeque<MockReply>>,
    otp_verifications: Mutex<VecDeque<MockReply>>,
    google_logins: Mutex<VecDeque<MockReply>>,
    product_lists: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<BackendCall>>,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_otp_request(self, reply: MockReply) -> Self {
        push(&self.otp_requests, reply);
        self
    }

    #[must_use]
    pub fn with_otp_verification(self, reply: MockReply) -> Self {
        push(&self.otp_verifications, reply);
        self
    }

    #[must_use]
    pub fn with_google_login(self, reply: MockReply) -> Self {
        push(&self.google_logins, reply);
        self
    }

    #[must_use]
    pub fn with_product_list(self, reply: MockReply) -> Self {
        push(&self.product_lists, reply);
        self
    }

    /// Queue another product list reply on a shared mock
    pub fn push_product_list(&self, reply: MockReply) {
        push(&self.product_lists, reply);
    }

    /// Every call so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the call log lock is poisoned
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn otp_request_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::RequestOtp { .. }))
    }

    #[must_use]
    pub fn otp_verification_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::VerifyOtp { .. }))
    }

    #[must_use]
    pub fn google_login_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::GoogleLogin { .. }))
    }

    /// Queries sent to the product list endpoint
    #[must_use]
    pub fn product_queries(&self) -> Vec<ProductQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::CategoryProducts(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: BackendCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn push(queue: &Mutex<VecDeque<MockReply>>, reply: MockReply) {
    if let Ok(mut queue) = queue.lock() {
        queue.push_back(reply);
    }
}

fn next(queue: &Mutex<VecDeque<MockReply>>, fallback: impl FnOnce() -> MockReply) -> MockReply {
    queue
        .lock()
        .ok()
        .and_then(|mut queue| queue.pop_front())
        .unwrap_or_else(fallback)
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn request_otp(&self, phone: &str) -> Result<ApiEnvelope, BackendError> {
        self.record(BackendCall::RequestOtp {
            phone: phone.to_string(),
        });
        next(&self.otp_requests, || MockReply::status(200, "OTP sent successfully")).into_result()
    }

    async fn verify_otp(&self, phone: &str, otp: u32) -> Result<ApiEnvelope, BackendError> {
        self.record(BackendCall::VerifyOtp {
            phone: phone.to_string(),
            otp,
        });
        next(&self.otp_verifications, || MockReply::status(400, "Invalid OTP")).into_result()
    }

    async fn verify_google_token(&self, id_token: &str) -> Result<ApiEnvelope, BackendError> {
        self.record(BackendCall::GoogleLogin {
            id_token: id_token.to_string(),
        });
        next(&self.google_logins, || MockReply::status(401, "Invalid Google token")).into_result()
    }

    async fn category_products(&self, query: &ProductQuery) -> Result<ApiEnvelope, BackendError> {
        self.record(BackendCall::CategoryProducts(query.clone()));
        next(&self.product_lists, || {
            MockReply::with_data(200, "Products fetched", json!({ "data": [] }))
        })
        .into_result()
    }
}

/// Script fetcher that counts fetches and can be told to fail
#[derive(Debug, Default)]
pub struct MockScriptFetcher {
    fetches: AtomicUsize,
    failures_left: AtomicUsize,
}

impl MockScriptFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` fetches
    #[must_use]
    pub fn failing(count: usize) -> Self {
        Self {
            fetches: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(count),
        }
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptFetcher for MockScriptFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            anyhow::bail!("network error while loading {url}");
        }
        Ok(format!("/* sdk loaded from {url} */"))
    }
}

/// Graph client returning one fixed profile, or failing
#[derive(Debug)]
pub struct MockGraphClient {
    profile: Option<FacebookProfile>,
    calls: AtomicUsize,
}

impl MockGraphClient {
    #[must_use]
    pub fn returning(name: &str, email: &str, photo: &str) -> Self {
        Self {
            profile: Some(FacebookProfile {
                name: name.to_string(),
                email: email.to_string(),
                picture: Some(FacebookPicture {
                    data: FacebookPictureData {
                        url: photo.to_string(),
                    },
                }),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            profile: None,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphClient for MockGraphClient {
    async fn profile(&self, _access_token: &str) -> anyhow::Result<FacebookProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.profile
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Graph API unreachable"))
    }
}

/// Completion sink that keeps every booking it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    completions: Mutex<Vec<BookingCompletion>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the recording lock is poisoned
    #[must_use]
    pub fn completions(&self) -> Vec<BookingCompletion> {
        self.completions.lock().unwrap().clone()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.completions().len()
    }
}

impl CompletionSink for RecordingSink {
    fn booking_completed(&self, completion: &BookingCompletion) {
        if let Ok(mut completions) = self.completions.lock() {
            completions.push(completion.clone());
        }
    }
}
