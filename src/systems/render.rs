//! Resolves each render component's visual-state bitset to an image
//!
//! Exact state matches win; otherwise the plain (NONE) image is used.

use crate::components::{RenderComponent, VisualState};
use crate::ecs::Store;

pub fn run(store: &mut Store) {
    for (_, render) in store.iter_mut::<RenderComponent>() {
        let resolved = render
            .images
            .get(&render.state)
            .or_else(|| render.images.get(&VisualState::NONE))
            .cloned();
        if let Some(image) = resolved {
            render.image = image;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_state_resolves_to_mapped_image() {
        let mut store = Store::new();
        let e = store.spawn();
        store.insert(
            e,
            RenderComponent::new(Vec2::ZERO, Vec2::splat(0.04), "peg-blue")
                .with_image_for(VisualState::LIT, "peg-blue-lit"),
        );

        run(&mut store);
        assert_eq!(store.get::<RenderComponent>(e).unwrap().image, "peg-blue");

        store.get_mut::<RenderComponent>(e).unwrap().state = VisualState::LIT;
        run(&mut store);
        assert_eq!(store.get::<RenderComponent>(e).unwrap().image, "peg-blue-lit");
    }

    #[test]
    fn test_unmapped_state_falls_back_to_plain() {
        let mut store = Store::new();
        let e = store.spawn();
        store.insert(
            e,
            RenderComponent::new(Vec2::ZERO, Vec2::splat(0.04), "cannon"),
        );
        store.get_mut::<RenderComponent>(e).unwrap().state =
            VisualState::LIT | VisualState::LOADED;

        run(&mut store);
        assert_eq!(store.get::<RenderComponent>(e).unwrap().image, "cannon");
    }
}
