//! Reel Motion Controller: per-reel spin phase machine

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rb_core::{MIN_PHASE_DURATION, ReelConfig, lerp, normalized, smoothstep};

use crate::strip::{ReelStrip, VisualItem};
use crate::symbols::SymbolCatalog;

/// Local spin phase of a reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpinMode {
    /// At rest, no movement
    #[default]
    Idle,
    /// Ramping up to full speed
    Accelerating,
    /// Holding full speed until stopped
    Running,
    /// Ramping down to the end speed
    Decelerating,
    /// Correcting the residual offset onto the center line
    Snapping,
}

impl SpinMode {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            SpinMode::Idle => "Idle",
            SpinMode::Accelerating => "Accelerating",
            SpinMode::Running => "Running",
            SpinMode::Decelerating => "Decelerating",
            SpinMode::Snapping => "Snapping",
        }
    }

    /// Whether a stop request is accepted in this mode
    pub fn accepts_stop(&self) -> bool {
        !matches!(self, SpinMode::Idle | SpinMode::Snapping)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Total downward translation applied
    pub moved: f32,
    /// Items moved back on top of the band
    pub recycled: usize,
    /// The stop-and-snap sequence finished this tick
    pub stopped: bool,
}

/// One reel's motion state
#[derive(Debug, Clone)]
pub struct ReelController {
    index: usize,
    config: ReelConfig,
    strip: ReelStrip,
    catalog: SymbolCatalog,
    rng: ChaCha8Rng,

    mode: SpinMode,
    current_speed: f32,
    phase_timer: f32,
    deceleration_start_speed: f32,
    snap_applied: f32,
    snap_to: f32,

    spins_completed: u64,
}

impl ReelController {
    /// Create a reel at rest with freshly randomized symbols
    pub fn new(index: usize, config: ReelConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        let strip = ReelStrip::new(config.item_count, config.item_height, config.center_line);
        let catalog = SymbolCatalog::new(config.symbols.clone());

        let mut reel = Self {
            index,
            config,
            strip,
            catalog,
            rng,
            mode: SpinMode::Idle,
            current_speed: 0.0,
            phase_timer: 0.0,
            deceleration_start_speed: 0.0,
            snap_applied: 0.0,
            snap_to: 0.0,
            spins_completed: 0,
        };
        reel.randomize_all_symbols();
        reel
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SIGNALS
    // ═══════════════════════════════════════════════════════════════════════════

    /// "start spin": begin accelerating from the current speed
    pub fn start_spin(&mut self) {
        self.phase_timer = 0.0;

        if self.config.acceleration_time <= MIN_PHASE_DURATION {
            self.mode = SpinMode::Running;
            self.current_speed = self.config.max_speed;
        } else {
            self.mode = SpinMode::Accelerating;
        }

        log::debug!("reel {} start -> {}", self.index, self.mode.name());
    }

    /// "stop spin": begin decelerating. No-op while Idle or Snapping.
    ///
    /// Returns true if the request was accepted.
    pub fn stop_spin(&mut self) -> bool {
        if !self.mode.accepts_stop() {
            log::trace!("reel {} ignores stop in {}", self.index, self.mode.name());
            return false;
        }

        self.deceleration_start_speed = self.current_speed;
        self.phase_timer = 0.0;
        self.mode = SpinMode::Decelerating;

        log::debug!(
            "reel {} decelerating from {:.1}",
            self.index,
            self.deceleration_start_speed
        );
        true
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TICK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance by `dt` seconds: phase update, then translation, then recycling
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut report = TickReport::default();

        if let Some(snap_delta) = self.update_motion(dt) {
            report.recycled += self.move_items_down(snap_delta);
            report.moved += snap_delta;

            if self.phase_timer >= self.config.snap_time {
                self.finish_snap(&mut report);
            }
        }

        if self.current_speed > 0.0 {
            let delta = self.current_speed * dt;
            report.recycled += self.move_items_down(delta);
            report.moved += delta;
        }

        report
    }

    /// Phase state machine. Returns the snap delta while Snapping.
    fn update_motion(&mut self, dt: f32) -> Option<f32> {
        let cfg = &self.config;

        match self.mode {
            SpinMode::Idle => {
                self.current_speed = 0.0;
                None
            }

            SpinMode::Accelerating => {
                self.phase_timer += dt;
                let t = normalized(self.phase_timer, cfg.acceleration_time);
                self.current_speed = cfg.max_speed * cfg.acceleration_curve.evaluate(t);

                if self.phase_timer >= cfg.acceleration_time {
                    self.current_speed = cfg.max_speed;
                    self.mode = SpinMode::Running;
                    log::debug!("reel {} running", self.index);
                }
                None
            }

            SpinMode::Running => {
                self.current_speed = cfg.max_speed;
                None
            }

            SpinMode::Decelerating => {
                self.phase_timer += dt;
                let t = normalized(self.phase_timer, cfg.deceleration_time);
                let speed = lerp(
                    self.deceleration_start_speed,
                    cfg.deceleration_end_speed,
                    cfg.deceleration_curve.evaluate(t),
                );
                self.current_speed = speed.max(0.0).min(cfg.max_speed);

                if self.phase_timer >= cfg.deceleration_time {
                    self.begin_snap();
                }
                None
            }

            SpinMode::Snapping => {
                self.phase_timer += dt;
                let s = smoothstep(normalized(self.phase_timer, cfg.snap_time));
                let target = self.snap_to * s;
                let delta = target - self.snap_applied;
                self.snap_applied = target;
                Some(delta)
            }
        }
    }

    fn begin_snap(&mut self) {
        let nearest = self.strip.nearest_offset();
        self.snap_to = nearest - self.config.center_line;
        self.snap_applied = 0.0;
        self.phase_timer = 0.0;
        self.mode = SpinMode::Snapping;
        self.current_speed = 0.0;

        log::debug!("reel {} snapping by {:.2}", self.index, self.snap_to);
    }

    fn finish_snap(&mut self, report: &mut TickReport) {
        self.current_speed = 0.0;
        self.mode = SpinMode::Idle;
        self.spins_completed += 1;
        report.stopped = true;

        log::debug!(
            "reel {} stopped on {}",
            self.index,
            self.center_symbol().unwrap_or("-")
        );
    }

    fn move_items_down(&mut self, delta: f32) -> usize {
        let Self {
            strip, catalog, rng, ..
        } = self;

        strip.move_down(delta, |item| {
            if let Some(symbol) = catalog.draw(rng) {
                item.symbol = Some(symbol);
            }
        })
    }

    fn randomize_all_symbols(&mut self) {
        let Self {
            strip, catalog, rng, ..
        } = self;

        for item in strip.items_mut() {
            if let Some(symbol) = catalog.draw(rng) {
                item.symbol = Some(symbol);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    pub fn mode(&self) -> SpinMode {
        self.mode
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn phase_timer(&self) -> f32 {
        self.phase_timer
    }

    pub fn deceleration_start_speed(&self) -> f32 {
        self.deceleration_start_speed
    }

    /// Snap correction target for the current/last snap
    pub fn snap_to(&self) -> f32 {
        self.snap_to
    }

    /// Snap correction applied so far
    pub fn snap_applied(&self) -> f32 {
        self.snap_applied
    }

    pub fn strip(&self) -> &ReelStrip {
        &self.strip
    }

    pub fn items(&self) -> &[VisualItem] {
        self.strip.items()
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// Completed stop-and-snap cycles
    pub fn spins_completed(&self) -> u64 {
        self.spins_completed
    }

    /// Whether the reel is moving or about to move
    pub fn is_active(&self) -> bool {
        self.mode != SpinMode::Idle
    }

    /// Symbol name of the item closest to the center line
    pub fn center_symbol(&self) -> Option<&str> {
        let index = self.strip.nearest_index()?;
        let symbol = self.strip.items()[index].symbol?;
        self.catalog.get(symbol)
    }
}
