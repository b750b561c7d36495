//! Session loop
//!
//! Orchestrates the systems once per tick in a fixed order: camera
//! scroll, level generation, AI intent, input application and firing,
//! entity physics, projectile resolution, deferred platform removal,
//! particle decay, pruning. Telemetry hooks fire inline with the facts
//! that triggered them; everything runs on one logical thread.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ArenaConfig;
use crate::game::input::InputState;
use crate::game::state::{GameState, OwnerSide, Side};
use crate::game::systems::{ai::AiController, level, particles, physics, projectile, SimEvent};
use crate::snapshot::RenderSnapshot;
use crate::telemetry::recorder::Recorder;
use crate::telemetry::summary::{summarize, EndReason, SessionMeta, SessionSummary};
use crate::telemetry::{MovementKind, SimulationClock, Stimulus, TelemetryEvent};

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Derives behavioral telemetry (reactions, drift, movement) from the
/// human input stream. Carries its own explicit timers; no ambient state.
#[derive(Debug)]
struct InputWatch {
    prev: InputState,
    last_input_t: f64,
    /// Last pressed horizontal direction (true = right)
    last_dir_right: Option<bool>,
    drifting: bool,
    /// Oldest unanswered stimulus awaiting a reaction
    threat_at: Option<(f64, Stimulus)>,
}

impl InputWatch {
    fn new() -> Self {
        Self {
            prev: InputState::default(),
            last_input_t: 0.0,
            last_dir_right: None,
            drifting: false,
            threat_at: None,
        }
    }

    fn note_threat(&mut self, t: f64, stimulus: Stimulus) {
        if self.threat_at.is_none() {
            self.threat_at = Some((t, stimulus));
        }
    }

    fn observe(
        &mut self,
        clock: &SimulationClock,
        config: &ArenaConfig,
        input: InputState,
        recorder: &mut Recorder,
    ) {
        let t = clock.seconds();
        let rising_left = input.left && !self.prev.left;
        let rising_right = input.right && !self.prev.right;
        let rising_jump = input.jump && !self.prev.jump;
        let rising_shoot = input.shoot && !self.prev.shoot;
        let any_rising = rising_left || rising_right || rising_jump || rising_shoot;

        // Stale stimuli are not attributable to whatever comes later
        if let Some((t0, _)) = self.threat_at {
            if t - t0 > config.telemetry.reaction_cap_s {
                self.threat_at = None;
            }
        }

        if any_rising {
            if self.drifting {
                recorder.drift(clock, t - self.last_input_t, true);
                self.drifting = false;
            }
            if let Some((t0, stimulus)) = self.threat_at.take() {
                recorder.reaction(clock, stimulus, t - t0);
            }
            self.last_input_t = t;
        } else if !self.drifting && t - self.last_input_t > config.telemetry.drift_threshold_s {
            self.drifting = true;
        }

        if rising_jump {
            recorder.movement(clock, MovementKind::Jump);
        }
        if rising_left {
            if self.last_dir_right == Some(true) {
                recorder.movement(clock, MovementKind::DirectionChange);
            }
            self.last_dir_right = Some(false);
        }
        if rising_right {
            if self.last_dir_right == Some(false) {
                recorder.movement(clock, MovementKind::DirectionChange);
            }
            self.last_dir_right = Some(true);
        }

        self.prev = input;
    }

    /// Close an open drift window at session end
    fn close(&mut self, clock: &SimulationClock, recorder: &mut Recorder) {
        if self.drifting {
            recorder.drift(clock, clock.seconds() - self.last_input_t, false);
            self.drifting = false;
        }
    }
}

/// One arena session from spawn to summary
pub struct Session {
    config: ArenaConfig,
    state: GameState,
    ai: AiController,
    recorder: Recorder,
    clock: SimulationClock,
    watch: InputWatch,
    meta: SessionMeta,
    end: Option<EndReason>,
    events_scratch: Vec<SimEvent>,
}

impl Session {
    pub fn new(config: ArenaConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid arena config");
        let mut state = GameState::new(&config);
        level::bootstrap(&mut state, &config);
        let ai = AiController::new(&config);
        let recorder = Recorder::new(config.telemetry.shot_hit_lookback_s);
        let clock = SimulationClock::new(config.physics.dt);
        let meta = SessionMeta {
            id: Uuid::new_v4(),
            started_unix_ms: unix_ms(),
        };
        info!("session {} started", meta.id);
        Self {
            config,
            state,
            ai,
            recorder,
            clock,
            watch: InputWatch::new(),
            meta,
            end: None,
            events_scratch: Vec::with_capacity(16),
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    pub fn is_over(&self) -> bool {
        self.end.is_some()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end
    }

    pub fn events(&self) -> &[TelemetryEvent] {
        self.recorder.events()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state)
    }

    /// Advance the simulation one tick. A no-op once the session ended.
    pub fn tick(&mut self, human_input: InputState) {
        if self.end.is_some() {
            return;
        }

        self.clock.advance();
        self.state.tick = self.clock.tick;
        self.state
            .camera
            .advance(self.config.physics.scroll_speed, self.config.physics.dt);

        // Generator runs before physics so platforms always exist ahead
        // of moving entities
        level::ensure_ahead(&mut self.state, &self.config);

        let ai_input = self.ai.decide(&self.state, &self.config);
        self.watch
            .observe(&self.clock, &self.config, human_input, &mut self.recorder);

        let mut events = std::mem::take(&mut self.events_scratch);
        events.clear();

        physics::apply_input(&mut self.state, &self.config, Side::Left, &human_input);
        physics::apply_input(&mut self.state, &self.config, Side::Right, &ai_input);
        if human_input.shoot {
            projectile::try_fire(&mut self.state, &self.config, Side::Left, &mut events);
        }
        if ai_input.shoot {
            projectile::try_fire(&mut self.state, &self.config, Side::Right, &mut events);
        }

        physics::update(&mut self.state, &self.config, &mut events);
        projectile::update(&mut self.state, &self.config, &mut events);
        self.state.apply_platform_removals();
        particles::update(&mut self.state, self.config.physics.dt);
        level::prune(&mut self.state, &self.config);

        self.process_events(&events);
        self.events_scratch = events;

        if self.end.is_none() && self.clock.tick >= self.config.session.max_ticks {
            self.end = Some(EndReason::TickLimit);
        }
    }

    /// Translate this tick's simulation facts into telemetry hooks and
    /// session termination
    fn process_events(&mut self, events: &[SimEvent]) {
        for event in events {
            match *event {
                SimEvent::ShotFired { side, mode } => {
                    self.recorder.shot(&self.clock, side, mode);
                    if side == Side::Right {
                        self.watch
                            .note_threat(self.clock.seconds(), Stimulus::IncomingShot);
                    }
                }
                SimEvent::ProjectileHit {
                    shooter,
                    target,
                    lethal,
                } => {
                    self.recorder.mark_recent_shot_hit(&self.clock, shooter);
                    if lethal && target == Side::Left {
                        self.end.get_or_insert(EndReason::HumanSlain);
                    }
                }
                SimEvent::FallDeath { side } => {
                    if side == Side::Left {
                        self.end.get_or_insert(EndReason::HumanFell);
                    } else {
                        debug!("AI combatant fell, respawn pending");
                    }
                }
                SimEvent::ModeSwitch { side, from, to } => {
                    if side == Side::Left {
                        self.recorder.mode_switch(&self.clock, side, from, to);
                    }
                }
                SimEvent::PlatformDestroyed { owner, .. } => {
                    if owner == OwnerSide::Left {
                        self.watch
                            .note_threat(self.clock.seconds(), Stimulus::PlatformCollapse);
                    }
                }
                SimEvent::PickupTaken { side, kind } => {
                    debug!("{side:?} collected {kind:?}");
                }
                SimEvent::Landed { .. } | SimEvent::Respawned { .. } => {}
            }
        }
    }

    /// Fold the session into its summary. Valid mid-session as well:
    /// leaving early still flushes a partial summary.
    pub fn finish(mut self) -> SessionSummary {
        self.watch.close(&self.clock, &mut self.recorder);
        let end = self.end.unwrap_or(EndReason::Aborted);
        let ended_unix_ms = unix_ms();
        let summary = summarize(
            &self.meta,
            end,
            ended_unix_ms,
            self.clock.tick,
            self.clock.seconds(),
            self.recorder.events(),
        );
        info!(
            "session {} finished: {:?}, {} ticks, {} events",
            self.meta.id,
            end,
            summary.ticks,
            summary.events.len()
        );
        summary
    }
}
