// SPDX-License-Identifier: MIT OR Apache-2.0
//! The intro sequencer state machine.
//!
//! States run `Idle -> Starting -> Playing <-> Paused -> Completed`. Every
//! delayed stage is a [`Step`] on the sequencer's own [`TimerRegistry`], so
//! time only moves when the owner calls [`Sequencer::advance_to`] and any
//! cancelled step is gone before it could run.

use crate::analytics::{millis, payload, AnalyticsRecorder, ErrorLog, Payload};
use crate::config::IntroConfig;
use crate::cue::{CueDispatcher, CueKind, SilentCues};
use crate::navigate::{LogNavigator, Navigator};
use crate::particles::{self, PARTICLE_COUNT, RESPAWN_GAP};
use crate::reveal::{
    self, RevealEffect, LANDING_IDLE_DELAY, MANUAL_TRANSITION_DELAY, PULSE_HALF_PERIOD,
};
use crate::script::{Script, ScriptHandle};
use crate::timer::{TimerHandle, TimerRegistry};
use crate::visual::{NullVisuals, Surface, VisualDispatcher, VisualState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::time::Duration;

/// Flags describing where the intro is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerState {
    /// Page currently shown (or last shown)
    pub current_page_index: usize,
    /// Number of pages, fixed for the session
    pub total_pages: usize,
    /// Pages are showing and auto-advance may run
    pub is_playing: bool,
    /// Playback was paused by the user
    pub is_paused: bool,
    /// A page is between "hide current" and "show next"
    pub is_transitioning: bool,
    /// The start control was activated
    pub intro_started: bool,
    /// The intro reached its end
    pub intro_completed: bool,
}

impl SequencerState {
    fn new(total_pages: usize) -> Self {
        Self {
            current_page_index: 0,
            total_pages,
            is_playing: false,
            is_paused: false,
            is_transitioning: false,
            intro_started: false,
            intro_completed: false,
        }
    }
}

/// Coarse playback phase derived from [`SequencerState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting on the landing screen
    Idle,
    /// Landing screen is animating away
    Starting,
    /// Pages are showing
    Playing,
    /// Pages are showing, auto-advance is held
    Paused,
    /// Overlay is up, navigation is imminent
    Completed,
}

/// Commands accepted from input sources and the control API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin the intro
    Start,
    /// Go to the next page
    Next,
    /// Go to the previous page
    Previous,
    /// Jump straight to completion
    Skip,
    /// Pause or resume auto-advance
    TogglePlayPause,
}

/// A delayed stage run by the sequencer when its timer comes due
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Landing logo settles and starts pulsing
    LandingIdle,
    /// One half of the landing logo pulse
    LandingPulse {
        /// Grow (true) or relax (false)
        grow: bool,
    },
    /// Landing is gone; start showing pages
    EnterPlayback,
    /// Auto-advance fired: the page slides out
    SlideOut {
        /// Page leaving
        page: usize,
    },
    /// Show a page
    ShowPage(usize),
    /// Apply a visual state
    Visual(Surface, VisualState),
    /// Play a cue
    Cue(CueKind),
    /// Start another drift cycle of a particle
    ParticleDrift(usize),
    /// Record completion and navigate away
    Finish,
}

/// Timer statistics kept when performance monitoring is enabled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceStats {
    /// Steps run so far
    pub steps_run: u64,
    /// Worst delay between a step's deadline and when it ran
    pub max_lateness: Duration,
}

impl PerformanceStats {
    fn record(&mut self, lateness: Duration) {
        self.steps_run += 1;
        self.max_lateness = self.max_lateness.max(lateness);
    }
}

/// Configuration and capabilities handed to the sequencer
pub struct SequencerContext {
    /// Static configuration
    pub config: IntroConfig,
    /// Audio cue output
    pub cues: Box<dyn CueDispatcher>,
    /// Surface styling
    pub visuals: Box<dyn VisualDispatcher>,
    /// Navigation side effect
    pub navigator: Box<dyn Navigator>,
}

impl SequencerContext {
    /// Context with silent cues, no visuals and a logging navigator
    pub fn new(config: IntroConfig) -> Self {
        Self {
            config,
            cues: Box::new(SilentCues),
            visuals: Box::new(NullVisuals),
            navigator: Box::new(LogNavigator),
        }
    }

    /// Use `cues` for audio
    pub fn with_cues(mut self, cues: impl CueDispatcher + 'static) -> Self {
        self.cues = Box::new(cues);
        self
    }

    /// Use `visuals` for surface styling
    pub fn with_visuals(mut self, visuals: impl VisualDispatcher + 'static) -> Self {
        self.visuals = Box::new(visuals);
        self
    }

    /// Use `navigator` for the final redirect
    pub fn with_navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Box::new(navigator);
        self
    }
}

/// The intro sequencer
pub struct Sequencer {
    context: SequencerContext,
    state: SequencerState,
    timers: TimerRegistry<Step>,
    analytics: AnalyticsRecorder,
    /// Sound enabled and audio available, decided once at construction
    sound: bool,
    booted: bool,
    hidden: bool,
    particles_spawned: bool,
    auto_advance: Option<ScriptHandle>,
    transition: Option<TimerHandle>,
    landing_pulse: Option<TimerHandle>,
    navigated_to: Option<String>,
    rng: StdRng,
    performance: Option<PerformanceStats>,
}

impl Sequencer {
    /// Create a sequencer in the Idle phase with the clock at zero
    pub fn new(context: SequencerContext) -> Self {
        let config = &context.config;
        let sound = config.enable_sound && context.cues.is_available();
        if config.enable_sound && !sound {
            tracing::warn!("Audio subsystem unavailable, cues disabled for this session");
        }

        Self {
            state: SequencerState::new(config.total_pages.max(1)),
            timers: TimerRegistry::new(),
            analytics: AnalyticsRecorder::new(config.enable_analytics),
            sound,
            booted: false,
            hidden: false,
            particles_spawned: false,
            auto_advance: None,
            transition: None,
            landing_pulse: None,
            navigated_to: None,
            rng: StdRng::from_os_rng(),
            performance: config.enable_performance.then(PerformanceStats::default),
            context,
        }
    }

    /// Seed the particle randomness
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Record faults into a shared error log
    pub fn with_error_log(mut self, errors: ErrorLog) -> Self {
        self.analytics = self.analytics.with_error_log(errors);
        self
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Static configuration
    pub fn config(&self) -> &IntroConfig {
        &self.context.config
    }

    /// Current state flags
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        let state = &self.state;
        if state.intro_completed {
            Phase::Completed
        } else if !state.intro_started {
            Phase::Idle
        } else if state.is_playing {
            Phase::Playing
        } else if state.is_paused {
            Phase::Paused
        } else {
            Phase::Starting
        }
    }

    /// Session analytics
    pub fn analytics(&self) -> &AnalyticsRecorder {
        &self.analytics
    }

    /// Current session time
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// When the next step is due
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Number of pending steps
    pub fn pending_steps(&self) -> usize {
        self.timers.pending()
    }

    /// Number of pending page changes (auto-advance or manual)
    pub fn pending_page_changes(&self) -> usize {
        self.timers
            .pending_actions()
            .filter(|step| matches!(step, Step::ShowPage(_)))
            .count()
    }

    /// Destination once navigation happened
    pub fn navigated_to(&self) -> Option<&str> {
        self.navigated_to.as_deref()
    }

    /// Timer statistics, when performance monitoring is enabled
    pub fn performance(&self) -> Option<&PerformanceStats> {
        self.performance.as_ref()
    }

    /// Whether the document is currently hidden
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Run every step due up to `target`, in deadline order
    pub fn advance_to(&mut self, target: Duration) {
        while let Some((handle, deadline, step)) = self.timers.pop_due(target) {
            if let Some(performance) = self.performance.as_mut() {
                performance.record(target.saturating_sub(deadline));
            }
            if self.transition == Some(handle) {
                self.transition = None;
            }
            if self.landing_pulse == Some(handle) {
                self.landing_pulse = None;
            }

            tracing::trace!(?step, at_ms = millis(deadline), "Running step");
            self.run_step(step);
        }
        self.timers.advance_clock(target);
    }

    /// Run every step due within `by` from now
    pub fn advance(&mut self, by: Duration) {
        self.advance_to(self.now() + by);
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Dispatch a command. Returns whether it was accepted.
    pub fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::Next => self.next(),
            Command::Previous => self.previous(),
            Command::Skip => self.skip(),
            Command::TogglePlayPause => self.toggle_play_pause(),
        }
    }

    /// Schedule the landing screen's idle animation
    pub fn boot(&mut self) {
        if self.booted || self.state.intro_started {
            return;
        }
        self.booted = true;
        self.landing_pulse = Some(self.timers.schedule(LANDING_IDLE_DELAY, Step::LandingIdle));
        tracing::info!("Intro sequencer ready ({} pages)", self.state.total_pages);
    }

    /// Begin the intro. Only valid from Idle.
    pub fn start(&mut self) -> bool {
        if self.state.intro_started {
            return false;
        }

        self.state.intro_started = true;
        self.analytics.interaction();
        self.play_cue(CueKind::Click);
        if let Some(pulse) = self.landing_pulse.take() {
            self.timers.cancel(pulse);
        }
        self.run_script(reveal::landing_exit());

        let config = &self.context.config;
        let data = payload([
            ("auto_play", json!(config.auto_play)),
            ("auto_play_delay", json!(config.auto_play_delay_ms)),
            ("transition_speed", json!(config.transition_speed_ms)),
        ]);
        self.analytics.record("intro_started", data, self.now());
        tracing::info!("Intro started");
        true
    }

    /// Show `index`, or complete the intro when `index` is past the end
    pub fn show_page(&mut self, index: usize) {
        if index >= self.state.total_pages {
            self.complete();
            return;
        }

        self.cancel_auto_advance();
        self.cancel_transition();

        let now = self.now();
        self.state.current_page_index = index;
        self.state.is_transitioning = true;
        self.apply(Surface::Page(index), VisualState::Shown);
        self.analytics.page_view(index, now);

        let effect = RevealEffect::for_page(index);
        let letters = self.context.config.logo_letters;
        self.run_script(effect.script(index, letters));
        self.state.is_transitioning = false;
        self.play_cue(CueKind::Transition);

        if self.context.config.auto_play && self.state.is_playing {
            self.auto_advance = Some(self.run_script(reveal::auto_advance(index)));
        }

        tracing::debug!(page = index, ?effect, "Showing page");
        self.analytics
            .record("page_view", payload([("page", json!(index))]), now);
    }

    /// Move to the next page after a short fade
    pub fn next(&mut self) -> bool {
        if !self.accepts_page_change() {
            return false;
        }
        let current = self.state.current_page_index;
        if current + 1 >= self.state.total_pages {
            return false;
        }
        self.begin_manual_transition(current + 1);
        true
    }

    /// Move to the previous page after a short fade
    pub fn previous(&mut self) -> bool {
        if !self.accepts_page_change() {
            return false;
        }
        let Some(target) = self.state.current_page_index.checked_sub(1) else {
            return false;
        };
        self.begin_manual_transition(target);
        true
    }

    /// Abandon the remaining pages and complete immediately
    pub fn skip(&mut self) -> bool {
        if !self.state.intro_started || self.state.intro_completed {
            return false;
        }

        let was_starting = self.phase() == Phase::Starting;
        self.cancel_all_timers();
        if was_starting {
            self.apply(Surface::Landing, VisualState::Dismissed);
        }
        for page in 0..self.state.total_pages {
            self.apply(Surface::Page(page), VisualState::Hidden);
        }

        self.complete();
        self.analytics.record("intro_skipped", Payload::new(), self.now());
        tracing::info!("Intro skipped");
        true
    }

    /// Pause auto-advance, or resume it from the full page delay
    pub fn toggle_play_pause(&mut self) -> bool {
        if self.state.is_playing {
            self.state.is_playing = false;
            self.state.is_paused = true;
            self.cancel_auto_advance();
            // A slide-out cut short has nothing in flight; bring the page back.
            if self.state.is_transitioning && self.transition.is_none() {
                self.state.is_transitioning = false;
                self.apply(Surface::Page(self.state.current_page_index), VisualState::Shown);
            }
            tracing::info!("Paused on page {}", self.state.current_page_index);
        } else if self.state.is_paused {
            self.state.is_paused = false;
            self.state.is_playing = true;
            tracing::info!("Resumed on page {}", self.state.current_page_index);
            // A pending manual transition lands on its target and re-arms autoplay there.
            if self.transition.is_none() {
                self.show_page(self.state.current_page_index);
            }
        } else {
            return false;
        }
        true
    }

    /// Show the completion overlay and schedule the redirect
    pub fn complete(&mut self) {
        if self.state.intro_completed {
            return;
        }

        self.state.intro_completed = true;
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.state.is_transitioning = false;
        self.cancel_auto_advance();
        self.cancel_transition();

        self.analytics.close_page_view(self.now());
        self.run_script(reveal::completion_overlay());
        if self.context.config.enable_particles {
            self.spawn_particles();
        }
        tracing::info!(
            "Intro complete, redirecting in {}ms",
            millis(reveal::FINALE_DELAY)
        );
    }

    // ------------------------------------------------------------------
    // Document events
    // ------------------------------------------------------------------

    /// The document finished loading
    pub fn document_loaded(&mut self) {
        let load_time = millis(self.now());
        self.analytics
            .record("page_loaded", payload([("load_time", json!(load_time))]), self.now());
    }

    /// The document was hidden or shown again
    pub fn set_visibility(&mut self, hidden: bool) {
        if hidden == self.hidden {
            return;
        }
        self.hidden = hidden;

        if hidden {
            self.context.cues.suspend();
            let dropped = self.cancel_all_timers();
            tracing::info!(dropped, "Document hidden, pending steps cancelled");
        } else {
            self.context.cues.resume();
            self.rearm();
        }
    }

    /// Pointer-driven tilt of the landing logo; only before the intro starts
    pub fn parallax(&mut self, x: f32, y: f32, viewport: (f32, f32)) -> bool {
        let (width, height) = viewport;
        if self.state.intro_started || width <= 0.0 || height <= 0.0 {
            return false;
        }

        let offset_x = (x / width - 0.5) * 20.0;
        let offset_y = (y / height - 0.5) * 20.0;
        self.apply(
            Surface::LandingLogo,
            VisualState::Parallax {
                rotate_deg: offset_x * 0.5,
                dx: offset_x * 0.3,
                dy: offset_y * 0.3,
            },
        );
        true
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn accepts_page_change(&self) -> bool {
        (self.state.is_playing || self.state.is_paused) && !self.state.is_transitioning
    }

    fn begin_manual_transition(&mut self, target: usize) {
        self.cancel_auto_advance();
        self.apply(Surface::Page(self.state.current_page_index), VisualState::Hidden);
        self.state.is_transitioning = true;
        self.transition = Some(
            self.timers
                .schedule(MANUAL_TRANSITION_DELAY, Step::ShowPage(target)),
        );
    }

    fn run_step(&mut self, step: Step) {
        match step {
            Step::LandingIdle => {
                self.apply(Surface::LandingLogo, VisualState::Idle);
                self.run_step(Step::LandingPulse { grow: true });
            }
            Step::LandingPulse { grow } => {
                self.apply(Surface::LandingLogo, reveal::pulse_state(grow));
                self.landing_pulse = Some(
                    self.timers
                        .schedule(PULSE_HALF_PERIOD, Step::LandingPulse { grow: !grow }),
                );
            }
            Step::EnterPlayback => {
                if self.state.intro_completed {
                    return;
                }
                self.state.is_playing = true;
                self.show_page(0);
            }
            Step::SlideOut { page } => {
                self.state.is_transitioning = true;
                self.apply(Surface::Page(page), VisualState::SlideOut);
            }
            Step::ShowPage(index) => self.show_page(index),
            Step::Visual(surface, state) => self.apply(surface, state),
            Step::Cue(kind) => self.play_cue(kind),
            Step::ParticleDrift(index) => self.drift_particle(index),
            Step::Finish => self.finish(),
        }
    }

    fn finish(&mut self) {
        if self.navigated_to.is_some() {
            return;
        }

        let now = self.now();
        let data = payload([
            ("duration", json!(millis(now))),
            ("pages", json!(self.analytics.page_views().len())),
            ("interactions", json!(self.analytics.interactions())),
        ]);
        self.analytics.record("intro_completed", data, now);

        let url = self.context.config.destination_url.clone();
        self.context.navigator.navigate(&url);
        self.navigated_to = Some(url);

        // The document unloads with the redirect.
        self.cancel_all_timers();
        if let Some(performance) = &self.performance {
            tracing::info!(
                steps = performance.steps_run,
                max_lateness_ms = millis(performance.max_lateness),
                "Timer performance"
            );
        }
    }

    /// Re-arm whatever a hidden document cancelled
    fn rearm(&mut self) {
        if self.navigated_to.is_some() {
            return;
        }

        match self.phase() {
            Phase::Idle => {
                if self.booted {
                    self.landing_pulse =
                        Some(self.timers.schedule(Duration::ZERO, Step::LandingIdle));
                }
            }
            Phase::Starting => {
                self.apply(Surface::Landing, VisualState::Dismissed);
                self.timers.schedule(Duration::ZERO, Step::EnterPlayback);
            }
            Phase::Playing => {
                self.state.is_transitioning = false;
                self.show_page(self.state.current_page_index);
            }
            Phase::Paused => {
                if self.state.is_transitioning {
                    self.state.is_transitioning = false;
                    self.apply(Surface::Page(self.state.current_page_index), VisualState::Shown);
                }
            }
            Phase::Completed => {
                self.run_script(reveal::completion_overlay());
                if self.particles_spawned {
                    for index in 0..PARTICLE_COUNT {
                        self.timers
                            .schedule(Duration::ZERO, Step::ParticleDrift(index));
                    }
                }
            }
        }
        tracing::info!(phase = ?self.phase(), "Document visible, steps re-armed");
    }

    fn spawn_particles(&mut self) {
        self.particles_spawned = true;
        for index in 0..PARTICLE_COUNT {
            let placement = particles::spawn(&mut self.rng);
            self.apply(Surface::Particle(index), placement);
            self.drift_particle(index);
        }
    }

    fn drift_particle(&mut self, index: usize) {
        let drift = particles::drift(&mut self.rng);
        let over = match &drift {
            VisualState::Drift { over, .. } => *over,
            _ => Duration::ZERO,
        };
        self.apply(Surface::Particle(index), drift);

        let surface = Surface::Particle(index);
        self.run_script(
            Script::new()
                .at(over, Step::Visual(surface, VisualState::Reset))
                .then(RESPAWN_GAP, Step::ParticleDrift(index)),
        );
    }

    fn run_script(&mut self, script: Script<Step>) -> ScriptHandle {
        script.run(&mut self.timers)
    }

    fn cancel_auto_advance(&mut self) {
        if let Some(handle) = self.auto_advance.take() {
            handle.cancel(&mut self.timers);
        }
    }

    fn cancel_transition(&mut self) {
        if let Some(handle) = self.transition.take() {
            self.timers.cancel(handle);
        }
    }

    fn cancel_all_timers(&mut self) -> usize {
        self.auto_advance = None;
        self.transition = None;
        self.landing_pulse = None;
        self.timers.cancel_all()
    }

    fn apply(&mut self, surface: Surface, state: VisualState) {
        self.context.visuals.apply(surface, state);
    }

    fn play_cue(&mut self, kind: CueKind) {
        if self.sound {
            self.context.cues.play(&kind.cue());
        }
    }
}
