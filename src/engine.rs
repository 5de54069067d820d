//! Tick orchestration, player input, and the render snapshot
//!
//! The engine owns the store, the physics world, the task scheduler, and a
//! seeded RNG. `advance` accumulates wall time and runs whole fixed-rate
//! ticks; each tick rebuilds the physics world's body list from the store,
//! steps it, writes the results back, dispatches collision events onto
//! components, and then runs every system in a fixed order.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::components::{
    AimComponent, Bucket, ClearComponent, GameStateComponent, GameStatus, LightComponent,
    OscillateComponent, PegColor, PhysicsComponent, PowerComponent, PowerKind, Removable,
    RenderComponent, ScoreComponent, TrajectoryComponent, TransitionHint, VisualState,
};
use crate::consts::{
    BALLS_PER_LEVEL, BALL_DENSITY, BALL_LAUNCH_SPEED, BALL_RESTITUTION, BALL_SIZE,
    BUCKET_AMPLITUDE, BUCKET_ANGULAR_FREQUENCY, BUCKET_CENTER, BUCKET_SIZE, CANNON_MAX_ANGLE,
    CANNON_MIN_ANGLE, CANNON_POSITION, CANNON_ROTATION, GREEN_PEGS_PER_LEVEL, LEVEL_Y_OFFSET,
    POWER_TURNS, SIM_DT, TRAJECTORY_MAX_COLLISIONS,
};
use crate::ecs::{Entity, Store};
use crate::level::{LevelError, LevelSpec};
use crate::physics::{BodyError, PhysicsBody, PhysicsWorld, Shape};
use crate::systems;
use crate::timer::Scheduler;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Body(#[from] BodyError),
}

/// One renderable entity, as the surrounding application sees it
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub entity: Entity,
    pub position: Vec2,
    pub rotation: f32,
    pub size: Vec2,
    pub image: String,
    pub opacity: f32,
    pub transition: TransitionHint,
    pub z_order: i32,
}

pub struct GameEngine {
    store: Store,
    world: PhysicsWorld,
    rng: Pcg32,
    scheduler: Scheduler,
    cannon: Entity,
    game_state: Entity,
    accumulator: f32,
}

impl GameEngine {
    /// Validate the level and build the board: cannon, bucket, pegs and
    /// blocks (shifted down by the level offset), and the game-state record.
    /// Two blue pegs are promoted to power-granting green pegs.
    pub fn new(level: &LevelSpec, seed: u64) -> Result<Self, EngineError> {
        level.validate()?;
        let mut store = Store::new();
        let mut rng = Pcg32::seed_from_u64(seed);
        let offset = Vec2::new(0.0, LEVEL_Y_OFFSET);

        let cannon = store.spawn();
        store.insert(
            cannon,
            AimComponent::new(
                CANNON_POSITION,
                CANNON_ROTATION,
                CANNON_MIN_ANGLE,
                CANNON_MAX_ANGLE,
            ),
        );
        store.insert(
            cannon,
            RenderComponent::new(CANNON_POSITION, Vec2::splat(0.08), "cannon").with_z_order(10),
        );
        store.insert(
            cannon,
            TrajectoryComponent::new(
                Shape::Circle,
                Vec2::splat(BALL_SIZE),
                TRAJECTORY_MAX_COLLISIONS,
            ),
        );

        // The bucket reports collisions but never pushes back, so a captured
        // ball passes into it
        let bucket = store.spawn();
        let mut bucket_body = PhysicsBody::new(Shape::Rect, BUCKET_SIZE, 1.0)?
            .with_position(BUCKET_CENTER)
            .as_static();
        bucket_body.affected_by_collisions = false;
        store.insert(bucket, PhysicsComponent::new(bucket_body));
        store.insert(
            bucket,
            OscillateComponent::new(BUCKET_CENTER, BUCKET_AMPLITUDE, BUCKET_ANGULAR_FREQUENCY, 0.0),
        );
        store.insert(
            bucket,
            RenderComponent::new(BUCKET_CENTER, BUCKET_SIZE, "bucket").with_z_order(2),
        );
        store.insert(bucket, Bucket);

        let mut blues: Vec<usize> = level
            .pegs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.color == PegColor::Blue)
            .map(|(i, _)| i)
            .collect();
        let mut promoted = Vec::new();
        for _ in 0..GREEN_PEGS_PER_LEVEL.min(blues.len()) {
            promoted.push(blues.swap_remove(rng.random_range(0..blues.len())));
        }

        for (i, peg) in level.pegs.iter().enumerate() {
            let color = if promoted.contains(&i) {
                PegColor::Green
            } else {
                peg.color
            };
            let position = peg.position + offset;
            let body = PhysicsBody::new(Shape::Circle, peg.size, 1.0)?
                .with_position(position)
                .with_rotation(peg.rotation)
                .as_static();

            let entity = store.spawn();
            store.insert(entity, PhysicsComponent::new(body));
            let stem = color.image_stem();
            store.insert(
                entity,
                RenderComponent::new(position, peg.size, stem)
                    .with_image_for(VisualState::LIT, format!("{stem}-lit"))
                    .with_z_order(1),
            );
            if let Some(render) = store.get_mut::<RenderComponent>(entity) {
                render.rotation = peg.rotation;
            }
            store.insert(entity, ScoreComponent::new(color));
            store.insert(entity, LightComponent::new(format!("{stem}-lit")));
            store.insert(entity, Removable);
            if color == PegColor::Green {
                let kind = if rng.random_bool(0.5) {
                    PowerKind::AreaLight
                } else {
                    PowerKind::PassThrough
                };
                store.insert(entity, PowerComponent::new(kind, POWER_TURNS));
            }
            if let Some(osc) = &peg.oscillation {
                store.insert(
                    entity,
                    OscillateComponent::new(position, osc.amplitude, osc.angular_frequency, osc.phase),
                );
            }
        }

        for block in &level.blocks {
            let position = block.position + offset;
            let body = PhysicsBody::new(Shape::Rect, block.size, 1.0)?
                .with_position(position)
                .with_rotation(block.rotation)
                .as_static();

            let entity = store.spawn();
            store.insert(entity, PhysicsComponent::new(body));
            store.insert(
                entity,
                RenderComponent::new(position, block.size, "block").with_z_order(1),
            );
            if let Some(render) = store.get_mut::<RenderComponent>(entity) {
                render.rotation = block.rotation;
            }
            store.insert(entity, Removable);
            if let Some(osc) = &block.oscillation {
                store.insert(
                    entity,
                    OscillateComponent::new(position, osc.amplitude, osc.angular_frequency, osc.phase),
                );
            }
        }

        let orange = level
            .pegs
            .iter()
            .filter(|p| p.color == PegColor::Orange)
            .count();
        let game_state = store.spawn();
        store.insert(game_state, GameStateComponent::new(orange, BALLS_PER_LEVEL));

        log::info!(
            "level '{}' loaded: {} pegs ({orange} orange), {} blocks",
            level.name,
            level.pegs.len(),
            level.blocks.len()
        );

        Ok(Self {
            store,
            world: PhysicsWorld::new(),
            rng,
            scheduler: Scheduler::new(),
            cannon,
            game_state,
            accumulator: 0.0,
        })
    }

    /// Accumulate wall time and run every whole fixed-rate tick it covers
    pub fn advance(&mut self, dt: f32) {
        self.accumulator += dt;
        while self.accumulator >= SIM_DT {
            self.accumulator -= SIM_DT;
            self.tick();
        }
    }

    /// One fixed simulation step
    pub fn tick(&mut self) {
        self.rebuild_bodies();
        self.world.apply_gravity();
        self.world.integrate(SIM_DT);
        let events = self.world.resolve_collisions();
        self.write_back_bodies();

        for event in events {
            self.dispatch(event.a, event.b);
            self.dispatch(event.b, event.a);
        }

        let due = self.scheduler.tick();
        systems::state::run(&mut self.store);
        systems::oscillate::run(&mut self.store, SIM_DT);
        systems::power::run(&mut self.store);
        systems::aim::run(&mut self.store);
        systems::trajectory::run(&mut self.store, &self.world);
        systems::score::run(&mut self.store, &mut self.rng);
        systems::clear::run(&mut self.store, &mut self.scheduler, due);
        systems::physics::run(&mut self.store);
        systems::render::run(&mut self.store);
    }

    /// Steer the cannon toward a board point. Ignored while a ball is in
    /// flight.
    pub fn on_drag_move(&mut self, point: Vec2) {
        if self.ball_in_flight() {
            return;
        }
        if let Some(aim) = self.store.get_mut::<AimComponent>(self.cannon) {
            aim.target = Some(point);
        }
    }

    /// Fire at a board point: spawns a ball with the aimed velocity and
    /// resets the aim and its preview. Ignored while a ball is in flight,
    /// once the game has ended, or with no balls left.
    pub fn on_drag_release(&mut self, point: Vec2) {
        if self.ball_in_flight() {
            return;
        }
        let state = self.game_state();
        if state.status != GameStatus::Playing || state.balls_remaining == 0 {
            return;
        }

        if let Some(aim) = self.store.get_mut::<AimComponent>(self.cannon) {
            aim.target = Some(point);
        }
        systems::aim::run(&mut self.store);
        let Some(direction) = self
            .store
            .get::<AimComponent>(self.cannon)
            .map(|aim| aim.velocity)
        else {
            return;
        };
        if direction == Vec2::ZERO {
            return;
        }

        self.spawn_ball(direction);
        self.reset_aim();
    }

    /// Global speed multiplier for the simulation
    pub fn set_speed(&mut self, speed: f32) {
        self.world.speed = speed.max(0.0);
    }

    pub fn game_state(&self) -> GameStateComponent {
        self.store
            .get::<GameStateComponent>(self.game_state)
            .cloned()
            .unwrap_or_else(|| GameStateComponent::new(0, 0))
    }

    pub fn ball_in_flight(&self) -> bool {
        self.store.count::<ClearComponent>() > 0
    }

    /// Everything renderable, back to front
    pub fn snapshot(&self) -> Vec<RenderSnapshot> {
        let mut snapshots: Vec<RenderSnapshot> = self
            .store
            .iter::<RenderComponent>()
            .map(|(entity, render)| RenderSnapshot {
                entity,
                position: render.position,
                rotation: render.rotation,
                size: render.size(),
                image: render.image.clone(),
                opacity: render.opacity,
                transition: render.transition,
                z_order: render.z_order,
            })
            .collect();
        snapshots.sort_by_key(|s| (s.z_order, s.entity.index()));
        snapshots
    }

    fn rebuild_bodies(&mut self) {
        let mut bodies: Vec<(Entity, PhysicsBody)> = self
            .store
            .iter::<PhysicsComponent>()
            .map(|(entity, physics)| (entity, physics.body.clone()))
            .collect();
        // Store iteration order is unspecified; a stable body order keeps
        // collision resolution deterministic for a given seed
        bodies.sort_by_key(|(entity, _)| (entity.index(), entity.generation()));
        self.world.set_bodies(bodies);
    }

    fn write_back_bodies(&mut self) {
        let bodies: Vec<(Entity, PhysicsBody)> = self
            .world
            .bodies()
            .map(|(entity, body)| (entity, body.clone()))
            .collect();
        for (entity, body) in bodies {
            if let Some(physics) = self.store.get_mut::<PhysicsComponent>(entity) {
                physics.body = body;
            }
        }
    }

    /// Apply one side of a collision event to the components of `entity`
    fn dispatch(&mut self, entity: Entity, other: Entity) {
        if let Some(power) = self.store.get_mut::<PowerComponent>(entity) {
            if !power.activated {
                power.activated = true;
                log::info!("power {:?} activated on {entity:?}", power.kind);
            }
        }

        let newly_scored = self
            .store
            .get_mut::<ScoreComponent>(entity)
            .map(|score| {
                let first = !score.has_scored;
                score.has_scored = true;
                first
            })
            .unwrap_or(false);
        if newly_scored {
            // Scored pegs glow so the clear protocol picks them up
            if let Some(light) = self.store.get_mut::<LightComponent>(entity) {
                light.lit = true;
            }
        }

        if self.store.has::<ClearComponent>(entity) && self.store.has::<Bucket>(other) {
            let pass_through = self.store.iter::<PowerComponent>().any(|(_, p)| {
                p.activated && p.kind == PowerKind::PassThrough && p.turns_remaining == 1
            });
            if !pass_through {
                if let Some(clear) = self.store.get_mut::<ClearComponent>(entity) {
                    if !clear.will_clear {
                        log::debug!("ball {entity:?} captured by the bucket");
                        clear.will_clear = true;
                    }
                }
            }
        }
    }

    fn spawn_ball(&mut self, direction: Vec2) {
        let Some(position) = self
            .store
            .get::<AimComponent>(self.cannon)
            .map(|aim| aim.position)
        else {
            return;
        };
        let speed = self.world.speed;
        let Ok(body) = PhysicsBody::new(Shape::Circle, Vec2::splat(BALL_SIZE), BALL_DENSITY) else {
            return;
        };
        let body = body
            .with_position(position)
            .with_velocity(direction * BALL_LAUNCH_SPEED * speed)
            .with_restitution(BALL_RESTITUTION);

        let ball = self.store.spawn();
        self.store.insert(ball, PhysicsComponent::new(body));
        self.store.insert(
            ball,
            RenderComponent::new(position, Vec2::splat(BALL_SIZE), "ball").with_z_order(3),
        );
        self.store.insert(ball, ClearComponent::new(speed));
        log::info!("ball {ball:?} launched toward {direction:?}");
    }

    fn reset_aim(&mut self) {
        if let Some(aim) = self.store.get_mut::<AimComponent>(self.cannon) {
            aim.target = None;
            aim.velocity = Vec2::ZERO;
        }
        let dots = self
            .store
            .get::<TrajectoryComponent>(self.cannon)
            .map(|t| t.point_entities.clone())
            .unwrap_or_default();
        for dot in dots {
            self.store.despawn(dot);
        }
        if let Some(traj) = self.store.get_mut::<TrajectoryComponent>(self.cannon) {
            traj.points.clear();
            traj.point_entities.clear();
        }
    }
}
