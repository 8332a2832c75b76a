use pretty_assertions::assert_eq;

use sprite_compositor::CellCoords;
use sprite_compositor::engine::Scene;
use sprite_compositor::surface::MemorySurface;

const AQUARIUM: &str = include_str!("../demos/aquarium.json");

fn render_frame(scene: &Scene, frame: usize) -> (sprite_compositor::Compositor, MemorySurface) {
    let mut compositor = scene.compositor().unwrap();
    let mut surface = MemorySurface::new(usize::from(scene.width), usize::from(scene.height));
    scene.draw_frame(frame, &mut compositor);
    compositor.render(&mut surface);
    (compositor, surface)
}

#[test]
fn aquarium_resolves() {
    let scene = Scene::from_json(AQUARIUM).unwrap();
    assert_eq!((scene.width, scene.height, scene.frame_count), (48, 12, 60));
    assert_eq!(scene.entities.len(), 6);
}

#[test]
fn aquarium_frame_layers_in_depth_order() {
    let scene = Scene::from_json(AQUARIUM).unwrap();
    let (compositor, surface) = render_frame(&scene, 0);

    assert_eq!(surface.row_text(11), ".".repeat(48));
    assert!(surface.row_text(0).ends_with("[ feed ]"));
    assert_eq!(compositor.target_at(CellCoords::new(42, 0)), Some("feed button"));
    // The blank degree sign is drawn as an opaque space.
    assert!(!surface.text().contains('°'));
}
