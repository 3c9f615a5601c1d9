//! Demo host: a two-screen app whose first screen is the splash.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::time::Instant;

use splash_config::SplashSettings;
use splash_engine::{Navigator, SessionEvent, SplashSession};
use splash_fetch::HttpFetcher;
use splash_types::{AssetFormat, FetchedAsset, NotSuccessful};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Main,
}

/// Screen history. Navigating to main replaces it, so back never returns
/// to the splash.
#[derive(Debug)]
pub struct Router {
    stack: Vec<Screen>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            stack: vec![Screen::Splash],
        }
    }

    pub fn current(&self) -> Option<Screen> {
        self.stack.last().copied()
    }

    pub fn stack(&self) -> &[Screen] {
        &self.stack
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for Router {
    fn navigate_to_main(&mut self) {
        self.stack.clear();
        self.stack.push(Screen::Main);
    }
}

/// What the splash knows about the banner download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerState {
    Disabled,
    Loading { url: String },
    Ready { format: AssetFormat, bytes: usize },
    NotLoaded(NotSuccessful),
}

enum Stage {
    Splash(Box<SplashSession<Router>>),
    Main(Router),
    Closed,
}

pub struct App {
    stage: Stage,
    delay: Duration,
    armed_since: Option<Instant>,
    banner: BannerState,
    quit: bool,
}

impl App {
    /// Build the app and its splash session. Must run inside a tokio runtime.
    pub fn new(settings: &SplashSettings) -> Result<Self> {
        let mut session = SplashSession::new(settings.duration, Router::new());
        let banner = match &settings.fetch {
            Some(fetch) => {
                let fetcher = HttpFetcher::new(fetch.http.clone())?;
                session = session.with_fetch(Arc::new(fetcher), fetch.url.clone());
                BannerState::Loading {
                    url: fetch.url.clone(),
                }
            }
            None => BannerState::Disabled,
        };

        Ok(Self {
            stage: Stage::Splash(Box::new(session)),
            delay: settings.duration,
            armed_since: None,
            banner,
            quit: false,
        })
    }

    /// Create the splash and bring it to the foreground.
    pub fn start(&mut self) {
        if let Stage::Splash(session) = &mut self.stage {
            let events = session.on_created();
            self.apply(events);
        }
        self.focus_gained();
    }

    pub fn screen(&self) -> Screen {
        match &self.stage {
            Stage::Splash(_) => Screen::Splash,
            Stage::Main(_) | Stage::Closed => Screen::Main,
        }
    }

    pub fn history(&self) -> &[Screen] {
        match &self.stage {
            Stage::Splash(session) => session.navigator().stack(),
            Stage::Main(router) => router.stack(),
            Stage::Closed => &[],
        }
    }

    pub fn banner(&self) -> &BannerState {
        &self.banner
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Fraction of the splash delay elapsed in the current foreground span.
    pub fn progress(&self) -> f64 {
        let Some(since) = self.armed_since else {
            return 0.0;
        };
        let ratio = since.elapsed().as_secs_f64() / self.delay.as_secs_f64().max(f64::EPSILON);
        ratio.clamp(0.0, 1.0)
    }

    /// Whether the splash timer is currently counting down.
    pub fn is_counting(&self) -> bool {
        matches!(&self.stage, Stage::Splash(s) if s.has_pending_transition())
    }

    /// Deliver elapsed timers and fetch results. Call once per frame.
    pub fn tick(&mut self) {
        if let Stage::Splash(session) = &mut self.stage {
            let events = session.process_events();
            self.apply(events);
        }
    }

    /// Returns `true` when the app should quit.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::FocusGained => self.focus_gained(),
            Event::FocusLost => self.focus_lost(),
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            _ => {}
        }
        self.quit
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl_c =
            key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl_c {
            self.request_quit();
            return;
        }

        match self.screen() {
            Screen::Splash => {
                if let Stage::Splash(session) = &mut self.stage {
                    let events = session.dismiss();
                    self.apply(events);
                }
            }
            Screen::Main => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.request_quit();
                }
            }
        }
    }

    fn focus_gained(&mut self) {
        if let Stage::Splash(session) = &mut self.stage {
            let events = session.on_foreground_enter();
            if session.has_pending_transition() && self.armed_since.is_none() {
                self.armed_since = Some(Instant::now());
            }
            self.apply(events);
        }
    }

    fn focus_lost(&mut self) {
        if let Stage::Splash(session) = &mut self.stage {
            let events = session.on_foreground_exit();
            self.armed_since = None;
            self.apply(events);
        }
    }

    /// Quit; a live splash is destroyed first so its fetch is cancelled.
    pub fn request_quit(&mut self) {
        if let Stage::Splash(session) = &mut self.stage {
            let events = session.on_destroyed();
            self.apply(events);
        }
        self.quit = true;
    }

    fn apply(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::FetchCompleted(asset) => self.banner_ready(&asset),
                SessionEvent::FetchNotSuccessful(reason) => {
                    self.banner = BannerState::NotLoaded(reason);
                }
                SessionEvent::Navigated => self.enter_main(),
            }
        }
    }

    fn banner_ready(&mut self, asset: &FetchedAsset) {
        tracing::debug!(?asset, "Banner ready");
        self.banner = BannerState::Ready {
            format: asset.format,
            bytes: asset.len(),
        };
    }

    fn enter_main(&mut self) {
        self.armed_since = None;
        self.stage = match mem::replace(&mut self.stage, Stage::Closed) {
            Stage::Splash(session) => Stage::Main(session.finish()),
            other => other,
        };
    }
}
