//! driver.rs
//!
//! Per-frame animation loop. Bevy's runner already schedules one `Update` per display
//! refresh, this module decides whether a tick does any work and in what order:
//! spins, then camera damping, then shader uniforms. Rendering happens after `Update`
//! so every frame shows the orientation computed in the same tick.
//!
//! Rotation advances by a fixed delta per tick rather than by elapsed time, so K ticks
//! always land on `initial + K * delta` regardless of frame pacing.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;

pub struct DriverPlugin {
    pub frame_limit: Option<u64>,
}

impl Plugin for DriverPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<DriverState>()
            .insert_resource(FrameDriver::new(self.frame_limit))
            .init_resource::<CancelToken>()
            .configure_sets(Update, (
                FrameSet::Input,
                FrameSet::Animate,
                FrameSet::Camera,
                FrameSet::Uniforms,
                FrameSet::Bookkeeping,
            ).chain().run_if(driver_active))
            .add_systems(PostStartup, start)
            .add_systems(Update, (
                advance_spins.in_set(FrameSet::Animate),
                count_tick.in_set(FrameSet::Bookkeeping),
            ))
            .add_systems(Last, stop_when_finished.run_if(in_state(DriverState::Running)))
            .add_systems(OnEnter(DriverState::Stopped), exit);
    }
}

/// Ordered stages of one tick
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Animate,
    Camera,
    Uniforms,
    Bookkeeping,
}

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriverState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Shared stop flag, clone it out of the world to stop the loop from elsewhere
#[derive(Resource, Clone, Default, Debug)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tick bookkeeping
#[derive(Resource, Debug, Clone, Default)]
pub struct FrameDriver {
    pub ticks: u64,
    pub limit: Option<u64>,
}

impl FrameDriver {
    pub fn new(limit: Option<u64>) -> Self {
        Self { ticks: 0, limit }
    }

    pub fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.ticks >= limit)
    }
}

/// Constant rotation about the local Y axis
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub delta: f32,
    pub angle: f32,
}

impl Spin {
    pub fn new(delta: f32) -> Self {
        Self { delta, angle: 0.0 }
    }

    pub fn advance(&mut self) {
        self.angle = (self.angle + self.delta).rem_euclid(TAU);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }
}

pub fn driver_active(
    state: Res<State<DriverState>>,
    driver: Res<FrameDriver>,
    token: Res<CancelToken>,
) -> bool {
    *state.get() == DriverState::Running && !driver.exhausted() && !token.is_cancelled()
}

fn start(mut next_state: ResMut<NextState<DriverState>>, driver: Res<FrameDriver>) {
    match driver.limit {
        Some(limit) => info!("render loop starting, stopping after {limit} ticks"),
        None => info!("render loop starting"),
    }
    next_state.set(DriverState::Running);
}

fn advance_spins(mut spinning: Query<(&mut Spin, &mut Transform)>) {
    for (mut spin, mut transform) in spinning.iter_mut() {
        spin.advance();
        transform.rotation = spin.rotation();
    }
}

fn count_tick(mut driver: ResMut<FrameDriver>) {
    driver.ticks += 1;
}

fn stop_when_finished(
    driver: Res<FrameDriver>,
    token: Res<CancelToken>,
    mut next_state: ResMut<NextState<DriverState>>,
) {
    if driver.exhausted() || token.is_cancelled() {
        next_state.set(DriverState::Stopped);
    }
}

fn exit(driver: Res<FrameDriver>, mut exit: EventWriter<AppExit>) {
    info!("render loop stopped after {} ticks", driver.ticks);
    exit.write(AppExit::Success);
}
