use rand::Rng;

use crate::{
    Controller, Course, FlightMetrics, Load, MotorCommand, Network, RigidBody, Sensors, Spring,
    TrackingParams, Vec2, VehicleParams, WaypointProgress,
};

/// Whether a step contributes to fitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepMode {
    /// Training step: accumulates metrics and applies the retirement penalty.
    Counted,
    /// Replay step: moves the vehicle and tracks waypoints, metrics untouched.
    Display,
}

/// What happened to a vehicle during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    /// The vehicle moved and is still flying.
    Flying,
    /// The step was skipped because `dt` was not finite.
    Skipped,
    /// The vehicle had already stopped; nothing changed.
    Inactive,
    /// The vehicle left the world box during this step.
    OutOfBounds,
    /// The controller failed or the state became non-finite.
    Faulted,
}

/// A two-motor drone flown by a controller.
///
/// The vehicle owns its controller, physical constants, kinematic state and
/// fitness counters. It does not own its targets: the [`Course`] is passed to
/// every [`step`](Self::step) and the vehicle only keeps an index into it.
///
/// Once a vehicle stops being active it is frozen: further steps never move
/// it again until [`reset`](Self::reset) or [`reset_flight`](Self::reset_flight).
#[derive(Debug, Clone)]
pub struct Vehicle<C = Network> {
    id: u64,
    params: VehicleParams,
    body: RigidBody,
    command: MotorCommand,
    active: bool,
    metrics: FlightMetrics,
    progress: WaypointProgress,
    tether: Option<Spring>,
    controller: C,
}

impl<C> Vehicle<C> {
    #[must_use]
    pub fn new(controller: C, params: VehicleParams) -> Self {
        Self {
            id: 0,
            body: RigidBody::at_rest(params.start_position),
            params,
            command: MotorCommand::IDLE,
            active: true,
            metrics: FlightMetrics::default(),
            progress: WaypointProgress::default(),
            tether: None,
            controller,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Attaches a spring tether and moves the vehicle to the spring's rest position.
    #[must_use]
    pub fn with_tether(mut self, spring: Spring) -> Self {
        self.tether = Some(spring);
        self.body = RigidBody::at_rest(self.home());
        self
    }

    /// Restores fitness counters, e.g. when rebuilding a vehicle from a snapshot.
    #[must_use]
    pub fn with_record(mut self, metrics: FlightMetrics, progress: WaypointProgress) -> Self {
        self.metrics = metrics;
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    #[must_use]
    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    #[must_use]
    pub fn command(&self) -> &MotorCommand {
        &self.command
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn metrics(&self) -> &FlightMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn progress(&self) -> &WaypointProgress {
        &self.progress
    }

    #[must_use]
    pub fn tether(&self) -> Option<&Spring> {
        self.tether.as_ref()
    }

    #[must_use]
    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    #[must_use]
    pub fn into_controller(self) -> C {
        self.controller
    }

    /// Moves the vehicle to `position` without touching anything else.
    pub fn place_at(&mut self, position: Vec2) {
        self.body.position = position;
    }

    #[must_use]
    pub fn distance_to_target(&self, course: &Course) -> f64 {
        self.body
            .position
            .distance(course.target(self.progress.target_index()).position())
    }

    #[must_use]
    pub fn sensors(&self, course: &Course) -> Sensors {
        Sensors::read(
            self.body.position,
            self.body.velocity,
            self.body.heading,
            self.body.angular_velocity,
            course.target(self.progress.target_index()).position(),
        )
    }

    /// Stops the vehicle for good and gives it the worst possible penalty.
    pub fn retire(&mut self) {
        self.stop(StepMode::Counted);
    }

    fn stop(&mut self, mode: StepMode) {
        self.active = false;
        self.body.freeze();
        self.command = MotorCommand::IDLE;
        if mode.is_counted() {
            self.metrics.apply_sentinel();
        }
    }

    fn home(&self) -> Vec2 {
        self.tether
            .as_ref()
            .map_or(self.params.start_position, Spring::rest_position)
    }

    /// Resets motion, controls, fitness counters and the target pointer.
    pub fn reset(&mut self) {
        self.reset_flight();
        self.metrics = FlightMetrics::default();
        self.progress = WaypointProgress::default();
    }

    /// Resets motion and controls only, keeping fitness counters.
    pub fn reset_flight(&mut self) {
        self.body = RigidBody::at_rest(self.home());
        self.command = MotorCommand::IDLE;
        self.active = true;
    }
}

impl<C> Vehicle<C>
where
    C: Controller,
{
    /// Advances the vehicle by `dt` seconds toward its current target on `course`.
    ///
    /// A non-finite `dt` is ignored. A controller error or a non-finite state
    /// after integration retires the vehicle instead of propagating.
    pub fn step(
        &mut self,
        course: &Course,
        tracking: &TrackingParams,
        dt: f64,
        mode: StepMode,
    ) -> StepOutcome {
        if !self.active {
            return StepOutcome::Inactive;
        }
        if !dt.is_finite() {
            return StepOutcome::Skipped;
        }

        let sensors = self.sensors(course);
        self.command = match self.controller.command(&sensors) {
            Ok(command) => command,
            Err(err) => {
                log::debug!("vehicle {} faulted: {err}", self.id);
                self.stop(mode);
                return StepOutcome::Faulted;
            }
        };

        let mut load = Load::resolve(self.body.heading, &self.command, &self.params);
        if let Some(spring) = &self.tether {
            load.force += spring.force(&self.body);
        }
        let last = self.body;
        self.body.integrate(load, &self.params, dt);

        if !self.body.is_finite() {
            log::debug!("vehicle {} faulted: non-finite state", self.id);
            self.body = last;
            self.stop(mode);
            return StepOutcome::Faulted;
        }
        if !self.params.bounds.contains(self.body.position) {
            // the exit tick still counts as flown
            if mode.is_counted() {
                self.metrics.active_time += dt;
            }
            self.stop(mode);
            return StepOutcome::OutOfBounds;
        }

        let distance = self.distance_to_target(course);
        if mode.is_counted() {
            self.metrics.accumulate(self.body.speed(), distance, dt);
        }
        self.progress.update(distance, dt, course, tracking);
        StepOutcome::Flying
    }
}

impl Vehicle<Network> {
    /// Breeds a child with a gene-wise crossover of both pilots' networks.
    ///
    /// The child starts at rest with no fitness and identifier 0.
    #[must_use]
    pub fn mate<R>(&self, partner: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let network = self.controller.crossover(&partner.controller, rng);
        Self::new(network, self.params.clone())
    }
}
