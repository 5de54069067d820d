//! Recomputes the remaining-orange count on every game state record

use crate::components::{GameStateComponent, PegColor, ScoreComponent};
use crate::ecs::Store;

pub fn run(store: &mut Store) {
    let orange_remaining = store
        .iter::<ScoreComponent>()
        .filter(|(_, score)| score.color == PegColor::Orange && !score.has_scored)
        .count();

    for (_, game) in store.iter_mut::<GameStateComponent>() {
        game.orange_remaining = orange_remaining;
    }
}
