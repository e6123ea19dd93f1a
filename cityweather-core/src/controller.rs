//! Display controller: ties form submissions and the refresh timer to the
//! fetcher and renders the outcome of each display cycle.
//!
//! Cycles are not serialized. A timer tick and a submission may be in flight
//! together, and whichever resolves last owns the display region.

use parking_lot::Mutex;
use std::{
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    error::{Result, WeatherError},
    provider::WeatherFetcher,
    render::{CardOptions, RenderError, Renderer, WeatherCard},
};

/// Where the display stands. Every cycle goes
/// `Idle → Loading → (Displaying | ErrorShown) → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Loading,
    Displaying,
    ErrorShown,
}

/// What a single display cycle ended up rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Displayed(WeatherCard),
    Failed(String),
}

impl CycleOutcome {
    pub fn is_displayed(&self) -> bool {
        matches!(self, Self::Displayed(_))
    }
}

/// Mutable application state owned by one controller.
#[derive(Debug, Clone)]
pub struct AppState {
    pub current_city: String,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub default_city: String,
    pub refresh_interval: Duration,
    pub card: CardOptions,
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_city: config.default_city.clone(),
            refresh_interval: config.refresh_interval(),
            card: CardOptions::local(&config.endpoints),
        }
    }
}

struct RefreshTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct Inner {
    fetcher: Arc<dyn WeatherFetcher>,
    renderer: Arc<dyn Renderer>,
    settings: AppSettings,
    state: Mutex<AppState>,
    display: watch::Sender<DisplayState>,
    refresh: Mutex<Option<RefreshTask>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(task) = self.refresh.get_mut().take() {
            task.cancel.cancel();
        }
    }
}

/// Weather display controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WeatherApp {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for WeatherApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApp")
            .field("fetcher", &self.inner.fetcher)
            .field("state", &*self.inner.state.lock())
            .field("display", &*self.inner.display.borrow())
            .finish_non_exhaustive()
    }
}

impl WeatherApp {
    pub fn new(
        fetcher: Arc<dyn WeatherFetcher>,
        renderer: Arc<dyn Renderer>,
        settings: AppSettings,
    ) -> Self {
        let (display, _) = watch::channel(DisplayState::Idle);
        let state = AppState {
            current_city: settings.default_city.clone(),
        };

        Self {
            inner: Arc::new(Inner {
                fetcher,
                renderer,
                settings,
                state: Mutex::new(state),
                display,
                refresh: Mutex::new(None),
            }),
        }
    }

    pub fn current_city(&self) -> String {
        self.inner.state.lock().current_city.clone()
    }

    pub fn display_state(&self) -> DisplayState {
        *self.inner.display.borrow()
    }

    /// Observe display state transitions.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.inner.display.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.lock().is_some()
    }

    /// Show the current city, then keep refreshing it on the configured period.
    pub async fn start(&self) -> CycleOutcome {
        let city = self.current_city();
        info!(city = %city, "Starting weather display");

        let outcome = self.display_cycle(&city).await;
        self.start_refreshing();
        outcome
    }

    /// Handle a form submission.
    ///
    /// Blank input is rejected without touching the network and leaves the
    /// current city unchanged.
    pub async fn submit(&self, input: &str) -> CycleOutcome {
        let city = input.trim();
        if city.is_empty() {
            debug!("Rejected empty city submission");
            return self.show_error(&WeatherError::EmptyCity);
        }

        self.inner.state.lock().current_city = city.to_string();
        self.display_cycle(city).await
    }

    /// One cycle for whatever city is current; what a timer tick does.
    pub async fn refresh(&self) -> CycleOutcome {
        let city = self.current_city();
        self.display_cycle(&city).await
    }

    /// Resolve, fetch, and render. Any failure is rendered as its message.
    pub async fn display_cycle(&self, city: &str) -> CycleOutcome {
        self.set_display(DisplayState::Loading);

        match self.load_card(city).await {
            Ok(card) => {
                info!(city = %card.city, "Rendering weather card");
                self.paint(|r| {
                    r.clear()?;
                    r.render_weather(&card)
                });
                self.set_display(DisplayState::Displaying);
                self.set_display(DisplayState::Idle);
                CycleOutcome::Displayed(card)
            }
            Err(e) => {
                warn!(city, error = %e, "Display cycle failed");
                self.show_error(&e)
            }
        }
    }

    async fn load_card(&self, city: &str) -> Result<WeatherCard> {
        let coords = self.inner.fetcher.resolve_city(city).await?;
        let snapshot = self
            .inner
            .fetcher
            .fetch_weather(coords.latitude, coords.longitude)
            .await?;

        let today = snapshot.today().ok_or(WeatherError::MissingForecast)?;
        Ok(WeatherCard::new(&coords.name, today, &self.inner.settings.card))
    }

    fn show_error(&self, err: &WeatherError) -> CycleOutcome {
        let message = err.to_string();
        self.paint(|r| {
            r.clear()?;
            r.render_error(&message)
        });
        self.set_display(DisplayState::ErrorShown);
        self.set_display(DisplayState::Idle);
        CycleOutcome::Failed(message)
    }

    fn paint<F>(&self, f: F)
    where
        F: FnOnce(&dyn Renderer) -> std::result::Result<(), RenderError>,
    {
        if let Err(e) = f(self.inner.renderer.as_ref()) {
            error!(error = %e, "Renderer failed");
        }
    }

    fn set_display(&self, state: DisplayState) {
        self.inner.display.send_replace(state);
    }

    /// Start the periodic refresh. No-op if it is already running.
    pub fn start_refreshing(&self) {
        let mut slot = self.inner.refresh.lock();
        if slot.is_some() {
            debug!("Refresh timer already running");
            return;
        }

        let period = self.inner.settings.refresh_interval;
        if period.is_zero() {
            error!("Refresh interval must be greater than zero; timer not started");
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(refresh_task(
            Arc::downgrade(&self.inner),
            period,
            cancel.clone(),
        ));

        info!(interval_ms = period.as_millis() as u64, "Refresh timer started");
        *slot = Some(RefreshTask { cancel, handle });
    }

    /// Stop the periodic refresh and wait for the timer task to exit.
    ///
    /// A cycle started by a tick is abandoned where it stands. Cycles started
    /// by submissions are not affected.
    pub async fn stop(&self) {
        let Some(RefreshTask { cancel, handle }) = self.inner.refresh.lock().take() else {
            return;
        };

        cancel.cancel();
        if let Err(e) = handle.await {
            warn!(error = %e, "Refresh task ended abnormally");
        }
        info!("Refresh timer stopped");
    }
}

async fn refresh_task(app: Weak<Inner>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = app.upgrade() else { break };
                let app = WeatherApp { inner };
                debug!(city = %app.current_city(), "Refresh tick");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("Refresh tick abandoned");
                        app.set_display(DisplayState::Idle);
                        break;
                    }
                    _ = app.refresh() => {}
                }
            }
        }
    }
}
