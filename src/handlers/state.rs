//! Shared application state and per-visitor state

use actix_web::HttpRequest;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::backend::{BackendClient, HttpBackend};
use crate::booking::{BookingFlow, CompletionSink, LoggingSink};
use crate::catalog::{Debouncer, ProductListing};
use crate::identity::{
    validate_environment, FacebookIdentity, GoogleIdentity, GraphClient, HttpGraphClient,
    HttpScriptFetcher, ProviderKind, ScriptFetcher, SdkLoader,
};
use crate::login::{LocalUserRegistry, LoginModal, LoginServices, SocialProviders, UserRegistry};
use crate::session::{
    extract_cookie_value, CookieFactory, FileStore, KeyValueStore, MemoryStore, SessionManager,
    LOGIN_COOKIE, PHONE_COOKIE, VISITOR_COOKIE,
};
use crate::settings::StorefrontSettings;

/// Everything one browser owns: its session, listing and booking wizard
pub struct Visitor {
    pub id: Uuid,
    pub session: Arc<SessionManager>,
    pub listing: Mutex<ProductListing>,
    pub price_debounce: Debouncer,
    pub booking: Mutex<BookingFlow>,
    /// Milliseconds since the owning state's epoch
    last_seen_ms: AtomicU64,
}

impl Visitor {
    fn last_seen_ms(&self) -> u64 {
        self.last_seen_ms.load(Ordering::Relaxed)
    }

    fn touch(&self, now_ms: u64) {
        self.last_seen_ms.fetch_max(now_ms, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for Visitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visitor").field("id", &self.id).finish_non_exhaustive()
    }
}

/// A visitor resolved for one request
#[derive(Debug, Clone)]
pub struct VisitorHandle {
    pub visitor: Arc<Visitor>,
    /// The visitor cookie must be (re)issued on the response
    pub is_new: bool,
}

pub struct AppState {
    pub settings: StorefrontSettings,
    pub backend: Arc<dyn BackendClient>,
    pub registry: Arc<dyn UserRegistry>,
    pub social: Arc<SocialProviders>,
    pub sink: Arc<dyn CompletionSink>,
    pub cookie_factory: CookieFactory,
    visitors: DashMap<Uuid, Arc<Visitor>>,
    epoch: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(
        settings: StorefrontSettings,
        backend: Arc<dyn BackendClient>,
        registry: Arc<dyn UserRegistry>,
        social: Arc<SocialProviders>,
        sink: Arc<dyn CompletionSink>,
    ) -> Self {
        let cookie_factory = CookieFactory::new(settings.cookies.secure);
        Self {
            settings,
            backend,
            registry,
            social,
            sink,
            cookie_factory,
            visitors: DashMap::new(),
            epoch: Instant::now(),
        }
    }

    /// Wire the production collaborators described by `settings`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is invalid or the registry file
    /// cannot be opened
    pub fn from_settings(settings: StorefrontSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();
        let backend: Arc<dyn BackendClient> =
            Arc::new(HttpBackend::with_client(http.clone(), &settings.backend.base_url)?);

        let registry_store: Arc<dyn KeyValueStore> = match &settings.storage.registry_file {
            Some(path) => {
                log::info!("Email registry stored in {path}");
                Arc::new(FileStore::open(path)?)
            }
            None => {
                log::info!("Email registry kept in memory");
                Arc::new(MemoryStore::new())
            }
        };
        let registry: Arc<dyn UserRegistry> = Arc::new(LocalUserRegistry::new(registry_store));

        let social = Arc::new(build_social_providers(
            &settings,
            Arc::new(HttpScriptFetcher::new(http.clone())),
            Arc::new(HttpGraphClient::new(http, settings.identity.graph_api_base())),
            &backend,
        ));

        Ok(Self::new(settings, backend, registry, social, Arc::new(LoggingSink)))
    }

    /// The visitor named by the request cookie, created on first sight
    ///
    /// For routes that change visitor state. Read-only routes use
    /// [`AppState::peek_visitor`] so cookie-less traffic stores nothing.
    pub fn visitor(&self, req: &HttpRequest) -> VisitorHandle {
        if let Some(visitor) = self.known_visitor(req) {
            return VisitorHandle {
                visitor,
                is_new: false,
            };
        }

        let visitor = Arc::new(self.create_visitor(req));
        log::debug!("New visitor {}", visitor.id);
        self.visitors.insert(visitor.id, Arc::clone(&visitor));
        self.enforce_capacity(visitor.id);
        VisitorHandle {
            visitor,
            is_new: true,
        }
    }

    /// The known visitor, or a throwaway one built from the request cookies
    ///
    /// The throwaway is never stored and no visitor cookie is issued for it.
    pub fn peek_visitor(&self, req: &HttpRequest) -> VisitorHandle {
        let visitor = self
            .known_visitor(req)
            .unwrap_or_else(|| Arc::new(self.create_visitor(req)));
        VisitorHandle {
            visitor,
            is_new: false,
        }
    }

    fn known_visitor(&self, req: &HttpRequest) -> Option<Arc<Visitor>> {
        let visitor = extract_cookie_value(req, VISITOR_COOKIE)
            .and_then(|raw| Uuid::parse_str(&raw).ok())
            .and_then(|id| self.visitors.get(&id).map(|entry| Arc::clone(entry.value())))?;
        visitor.touch(self.now_ms());
        Some(visitor)
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Drop every visitor unseen for longer than `visitors.idle_timeout_secs`
    ///
    /// Returns how many were dropped.
    pub fn sweep_idle(&self) -> usize {
        let idle_ms = u64::try_from(self.settings.visitor_idle_timeout().as_millis())
            .unwrap_or(u64::MAX);
        let cutoff = self.now_ms().saturating_sub(idle_ms);
        let before = self.visitors.len();
        self.visitors
            .retain(|_, visitor| visitor.last_seen_ms() >= cutoff);
        let dropped = before.saturating_sub(self.visitors.len());
        if dropped > 0 {
            log::debug!("Dropped {dropped} idle visitors, {} remain", self.visitors.len());
        }
        dropped
    }

    /// Keep the map within `visitors.max_visitors`, never evicting `keep`
    fn enforce_capacity(&self, keep: Uuid) {
        let max = self.settings.visitors.max_visitors;
        if self.visitors.len() <= max {
            return;
        }
        self.sweep_idle();
        while self.visitors.len() > max {
            let oldest = self
                .visitors
                .iter()
                .filter(|entry| *entry.key() != keep)
                .min_by_key(|entry| entry.value().last_seen_ms())
                .map(|entry| *entry.key());
            let Some(id) = oldest else { break };
            self.visitors.remove(&id);
            log::warn!("Visitor limit of {max} reached, evicted visitor {id}");
        }
    }

    fn create_visitor(&self, req: &HttpRequest) -> Visitor {
        let session = Arc::new(SessionManager::new(Arc::new(MemoryStore::new())));
        for name in [LOGIN_COOKIE, PHONE_COOKIE] {
            if let Some(value) = extract_cookie_value(req, name) {
                session.absorb_cookie(name, &value);
            }
        }

        let login = LoginModal::new(
            Arc::clone(&session),
            LoginServices {
                backend: Arc::clone(&self.backend),
                registry: Arc::clone(&self.registry),
                social: Arc::clone(&self.social),
            },
            self.settings.login_options(),
        );

        Visitor {
            id: Uuid::new_v4(),
            booking: Mutex::new(BookingFlow::new(
                Arc::clone(&session),
                login,
                Arc::clone(&self.sink),
            )),
            listing: Mutex::new(ProductListing::new(self.settings.initial_filters())),
            price_debounce: Debouncer::new(self.settings.price_debounce()),
            session,
            last_seen_ms: AtomicU64::new(self.now_ms()),
        }
    }

    #[must_use]
    pub fn visitor_count(&self) -> usize {
        self.visitors.len()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("social", &self.social)
            .field("visitors", &self.visitors.len())
            .finish_non_exhaustive()
    }
}

/// Run [`AppState::sweep_idle`] every `visitors.sweep_interval_secs`
#[must_use]
pub fn spawn_visitor_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    let period = state
        .settings
        .visitor_sweep_interval()
        .max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            state.sweep_idle();
        }
    })
}

/// Google (verified with basic fallback) and Facebook from the identity settings
#[must_use]
pub fn build_social_providers(
    settings: &StorefrontSettings,
    fetcher: Arc<dyn ScriptFetcher>,
    graph: Arc<dyn GraphClient>,
    backend: &Arc<dyn BackendClient>,
) -> SocialProviders {
    let identity = &settings.identity;
    let google_client_id = identity.get_google_client_id();
    let facebook_app_id = identity.get_facebook_app_id();
    validate_environment(&google_client_id, &facebook_app_id);

    let google_loader = || {
        SdkLoader::new(
            ProviderKind::Google,
            identity.google_script_url.clone(),
            google_client_id.clone(),
            Arc::clone(&fetcher),
        )
    };

    SocialProviders::new()
        .with_google_verified(Arc::new(GoogleIdentity::verified(
            google_loader(),
            Arc::clone(backend),
        )))
        .with_google_basic(Arc::new(GoogleIdentity::basic(google_loader())))
        .with_facebook(Arc::new(FacebookIdentity::new(
            SdkLoader::new(
                ProviderKind::Facebook,
                identity.facebook_script_url.clone(),
                facebook_app_id,
                Arc::clone(&fetcher),
            ),
            graph,
        )))
}
