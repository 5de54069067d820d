//! Scoring pass: purple-peg upkeep, peg imagery, and tiered multipliers
//!
//! Exactly one rare purple peg exists per level in progress: whenever none
//! remains and a blue peg is available, one blue peg is reassigned at
//! random. Multipliers scale with how few un-scored orange pegs are left.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::components::{
    LightComponent, PegColor, RenderComponent, ScoreComponent, VisualState,
    multiplier_for_orange_count,
};
use crate::ecs::{Entity, Store};

pub fn run(store: &mut Store, rng: &mut Pcg32) {
    let unscored_orange = store
        .iter::<ScoreComponent>()
        .filter(|(_, s)| s.color == PegColor::Orange && !s.has_scored)
        .count();
    let purple_count = store
        .iter::<ScoreComponent>()
        .filter(|(_, s)| s.color == PegColor::Purple)
        .count();

    if purple_count == 0 {
        promote_random_blue(store, rng);
    }

    let multiplier = multiplier_for_orange_count(unscored_orange);
    for entity in store.entities_with::<ScoreComponent>() {
        let Some(score) = store.get::<ScoreComponent>(entity) else {
            continue;
        };
        let color = score.color;
        let scored = score.has_scored;

        if let Some(score) = store.get_mut::<ScoreComponent>(entity) {
            if !score.has_scored {
                score.multiplier = multiplier;
            }
        }

        let glowing = scored
            || store
                .get::<LightComponent>(entity)
                .map(|l| l.lit)
                .unwrap_or(false);
        if let Some(render) = store.get_mut::<RenderComponent>(entity) {
            let stem = color.image_stem();
            render.images.insert(VisualState::NONE, stem.to_string());
            render.images.insert(VisualState::LIT, format!("{stem}-lit"));
            render.state.set(VisualState::LIT, glowing);
        }
    }
}

/// Reassign one randomly-chosen blue peg to purple. Candidates are ordered
/// by entity index first so the seeded pick is deterministic.
fn promote_random_blue(store: &mut Store, rng: &mut Pcg32) {
    let mut blues: Vec<Entity> = store
        .iter::<ScoreComponent>()
        .filter(|(_, s)| s.color == PegColor::Blue)
        .map(|(e, _)| e)
        .collect();
    if blues.is_empty() {
        return;
    }
    blues.sort_by_key(|e| e.index());

    let pick = blues[rng.random_range(0..blues.len())];
    if let Some(score) = store.get_mut::<ScoreComponent>(pick) {
        score.color = PegColor::Purple;
        log::debug!("peg {pick:?} promoted to purple");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn peg(store: &mut Store, color: PegColor) -> Entity {
        let e = store.spawn();
        store.insert(e, ScoreComponent::new(color));
        store.insert(
            e,
            RenderComponent::new(glam::Vec2::ZERO, glam::Vec2::splat(0.04), "peg"),
        );
        e
    }

    #[test]
    fn test_exactly_one_purple_appears() {
        let mut store = Store::new();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..5 {
            peg(&mut store, PegColor::Blue);
        }

        run(&mut store, &mut rng);
        let purples = store
            .iter::<ScoreComponent>()
            .filter(|(_, s)| s.color == PegColor::Purple)
            .count();
        assert_eq!(purples, 1);

        // A purple already exists: no further promotion
        run(&mut store, &mut rng);
        let purples = store
            .iter::<ScoreComponent>()
            .filter(|(_, s)| s.color == PegColor::Purple)
            .count();
        assert_eq!(purples, 1);
    }

    #[test]
    fn test_no_blue_means_no_promotion() {
        let mut store = Store::new();
        let mut rng = Pcg32::seed_from_u64(7);
        peg(&mut store, PegColor::Orange);

        run(&mut store, &mut rng);
        let purples = store
            .iter::<ScoreComponent>()
            .filter(|(_, s)| s.color == PegColor::Purple)
            .count();
        assert_eq!(purples, 0);
    }

    #[test]
    fn test_multiplier_follows_orange_count() {
        let mut store = Store::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let oranges: Vec<Entity> = (0..5).map(|_| peg(&mut store, PegColor::Orange)).collect();
        let blue = peg(&mut store, PegColor::Blue);

        run(&mut store, &mut rng);
        // 5 un-scored orange pegs: tier 4-7 gives 5x
        assert_eq!(store.get::<ScoreComponent>(blue).unwrap().multiplier, 5);

        for e in &oranges {
            store.get_mut::<ScoreComponent>(*e).unwrap().has_scored = true;
        }
        run(&mut store, &mut rng);
        // All scored: top tier
        assert_eq!(store.get::<ScoreComponent>(blue).unwrap().multiplier, 100);
    }

    #[test]
    fn test_scored_peg_rendered_lit_with_color_image() {
        let mut store = Store::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let orange = peg(&mut store, PegColor::Orange);
        store.get_mut::<ScoreComponent>(orange).unwrap().has_scored = true;

        run(&mut store, &mut rng);
        let render = store.get::<RenderComponent>(orange).unwrap();
        assert!(render.state.contains(VisualState::LIT));
        assert_eq!(
            render.images.get(&VisualState::LIT).map(String::as_str),
            Some("peg-orange-lit")
        );
    }
}
