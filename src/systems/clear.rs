//! Ball-removal sequencing
//!
//! Two independent sub-protocols per ball:
//!
//! 1. While the ball rests, a repeating one-shot timer picks the nearest
//!    removable entity below the ball. A lit target is removed outright;
//!    an unlit one is faded and made non-collidable until the ball settles
//!    past it, then restored.
//! 2. Each tick, a ball marked `will_clear` (bucket capture) or fallen
//!    past the board bottom is cleared: every lit entity is removed (active
//!    powers cascade to a replacement slot), the ball is despawned, and
//!    every activated power decays by one turn.

use glam::Vec2;

use crate::components::{
    ClearComponent, GameOutcome, GameStateComponent, GameStatus, LightComponent, PegColor,
    PhysicsComponent, PowerComponent, RenderComponent, Removable, ScoreComponent, TransitionHint,
};
use crate::consts::{BALL_LOST_Y, PEG_FADE_DELAY, PEG_FADE_OPACITY};
use crate::ecs::{Entity, Store};
use crate::physics::is_colliding;
use crate::timer::{Scheduler, Task};

pub fn run(store: &mut Store, scheduler: &mut Scheduler, due: Vec<Task>) {
    arm_timers(store, scheduler);

    for task in due {
        match task {
            Task::ClearFire { ball } => fire_clear_timer(store, scheduler, ball),
            Task::RestorePeg { peg, ball } => restore_peg(store, scheduler, peg, ball),
        }
    }

    for ball in store.entities_with::<ClearComponent>() {
        let marked = store
            .get::<ClearComponent>(ball)
            .map(|c| c.will_clear)
            .unwrap_or(false);
        let lost = store
            .get::<PhysicsComponent>(ball)
            .map(|p| p.body.position.y > BALL_LOST_Y)
            .unwrap_or(false);
        if marked || lost {
            clear_ball(store, scheduler, ball);
        }
    }
}

/// Keep a clear timer pending exactly while the ball rests
fn arm_timers(store: &mut Store, scheduler: &mut Scheduler) {
    for ball in store.entities_with::<ClearComponent>() {
        let resting = store
            .get::<PhysicsComponent>(ball)
            .map(|p| p.body.is_resting)
            .unwrap_or(false);
        let Some(clear) = store.get_mut::<ClearComponent>(ball) else {
            continue;
        };

        if resting {
            if clear.timer.is_none() {
                let interval = 1.0 / clear.speed;
                clear.timer = Some(scheduler.schedule_in(interval, Task::ClearFire { ball }));
            }
        } else if let Some(id) = clear.timer.take() {
            // No firing while in flight
            scheduler.cancel(id);
        }
    }
}

fn fire_clear_timer(store: &mut Store, scheduler: &mut Scheduler, ball: Entity) {
    let Some(ball_position) = store
        .get::<PhysicsComponent>(ball)
        .map(|p| p.body.position)
    else {
        return;
    };
    if let Some(clear) = store.get_mut::<ClearComponent>(ball) {
        // Consumed; arm_timers re-arms next tick if the ball still rests
        clear.timer = None;
    }

    let Some(target) = nearest_removable_below(store, ball_position) else {
        return;
    };

    let lit = store
        .get::<LightComponent>(target)
        .map(|l| l.lit)
        .unwrap_or(false);
    if lit {
        log::debug!("clear timer removes lit peg {target:?}");
        remove_preserving_power(store, target, false);
    } else if store.has::<PhysicsComponent>(target) && store.has::<RenderComponent>(target) {
        log::debug!("clear timer fades peg {target:?}");
        if let Some(physics) = store.get_mut::<PhysicsComponent>(target) {
            physics.body.affected_by_collisions = false;
        }
        if let Some(render) = store.get_mut::<RenderComponent>(target) {
            render.opacity = PEG_FADE_OPACITY;
            render.transition = TransitionHint::Fade;
        }
        scheduler.schedule_in(PEG_FADE_DELAY, Task::RestorePeg { peg: target, ball });
    }
}

/// The removable entity nearest to the ball that lies further down the board
fn nearest_removable_below(store: &Store, ball_position: Vec2) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;
    for entity in store.entities_with::<Removable>() {
        let Some(position) = store
            .get::<PhysicsComponent>(entity)
            .map(|p| p.body.position)
        else {
            continue;
        };
        if position.y <= ball_position.y {
            continue;
        }
        let distance = position.distance(ball_position);
        if best.map(|(_, d)| distance < d).unwrap_or(true) {
            best = Some((entity, distance));
        }
    }
    best.map(|(entity, _)| entity)
}

/// Re-check a faded peg: restore it once the ball has settled past it (or
/// is gone); otherwise poll again next tick.
fn restore_peg(store: &mut Store, scheduler: &mut Scheduler, peg: Entity, ball: Entity) {
    if !store.is_live(peg) {
        return;
    }

    let overlapping = match (
        store.get::<PhysicsComponent>(ball),
        store.get::<PhysicsComponent>(peg),
    ) {
        (Some(b), Some(p)) => is_colliding(&b.body, &p.body),
        _ => false,
    };
    if overlapping {
        scheduler.schedule_in_ticks(1, Task::RestorePeg { peg, ball });
        return;
    }

    if let Some(physics) = store.get_mut::<PhysicsComponent>(peg) {
        physics.body.affected_by_collisions = true;
    }
    if let Some(render) = store.get_mut::<RenderComponent>(peg) {
        render.opacity = 1.0;
        render.transition = TransitionHint::Fade;
    }
}

/// Despawn an entity, keeping its power alive on a fresh replacement slot.
/// The timer path cascades any power; ball clearing preserves active ones
/// only.
fn remove_preserving_power(store: &mut Store, entity: Entity, active_only: bool) {
    let power = store.remove::<PowerComponent>(entity);
    store.despawn(entity);
    if let Some(power) = power {
        if power.activated || !active_only {
            let slot = store.spawn();
            store.insert(slot, power);
        }
    }
}

/// Remove the ball and everything it lit, then decay powers and settle the
/// game state
fn clear_ball(store: &mut Store, scheduler: &mut Scheduler, ball: Entity) {
    let mut gained: u64 = 0;
    let lit: Vec<Entity> = store
        .iter::<LightComponent>()
        .filter(|(_, light)| light.lit)
        .map(|(entity, _)| entity)
        .collect();
    for entity in lit {
        if let Some(score) = store.get::<ScoreComponent>(entity) {
            if score.has_scored {
                gained += score.score_value();
            }
        }
        remove_preserving_power(store, entity, true);
    }

    if let Some(clear) = store.get_mut::<ClearComponent>(ball) {
        if let Some(id) = clear.timer.take() {
            scheduler.cancel(id);
        }
    }
    store.despawn(ball);

    for entity in store.entities_with::<PowerComponent>() {
        let expired = match store.get_mut::<PowerComponent>(entity) {
            Some(power) if power.activated => {
                power.turns_remaining -= 1;
                power.turns_remaining < 0
            }
            _ => false,
        };
        if expired {
            store.remove::<PowerComponent>(entity);
        }
    }

    let orange_left = store
        .iter::<ScoreComponent>()
        .filter(|(_, s)| s.color == PegColor::Orange && !s.has_scored)
        .count();
    for (_, game) in store.iter_mut::<GameStateComponent>() {
        game.score += gained;
        game.balls_remaining = game.balls_remaining.saturating_sub(1);
        game.orange_remaining = orange_left;
        if game.status == GameStatus::Playing {
            if orange_left == 0 {
                game.status = GameStatus::Ended(GameOutcome::Won);
            } else if game.balls_remaining == 0 {
                game.status = GameStatus::Ended(GameOutcome::Lost);
            }
        }
        log::info!(
            "ball cleared: +{gained} score, {} balls left, {orange_left} orange left",
            game.balls_remaining
        );
    }
}
