//! Per-frame draw list
//!
//! The app describes each frame as a [`Scene`] and hands it to a
//! [`Renderer`]. Draw order is background, seed pile, perched birds, flying
//! birds, then menu text.

use std::path::{Path, PathBuf};

use glam::Vec2;

use crate::assets::{AssetCatalog, SheetInfo, read_png_size};
use crate::consts::{WIN_HEIGHT, WIN_WIDTH};
use crate::daylight::TimeOfDay;
use crate::error::AssetError;
use crate::menu::{MenuKind, MenuLine};
use crate::sim::{Facing, FeederState, Rect};

/// Scale and placement of the background art
const BACKGROUND_SCALE: f32 = 1.25;
const BACKGROUND_CENTER: Vec2 = Vec2::new(200.0, 112.5);

/// Something that draws scenes
pub trait Renderer {
    /// Load a sprite sheet and report its size
    fn load_sheet(&mut self, path: &Path) -> Result<SheetInfo, AssetError>;
    fn present(&mut self, scene: &Scene);
}

/// Part of a texture placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: PathBuf,
    /// Texture pixels
    pub source: Rect,
    /// World rectangle
    pub dest: Rect,
    pub flip_x: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BirdSprite {
    pub bird: u32,
    pub flying: bool,
    pub sprite: Sprite,
}

/// One frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// World point at the center of the view
    pub camera: Vec2,
    pub time_of_day: TimeOfDay,
    pub background: Option<Sprite>,
    pub seed: Option<Sprite>,
    /// Perched birds first, then flying ones
    pub birds: Vec<BirdSprite>,
    pub menu: Option<MenuKind>,
    pub menu_lines: Vec<MenuLine>,
}

/// Describe the current frame
pub fn build_scene(
    state: &FeederState,
    catalog: &AssetCatalog,
    time_of_day: TimeOfDay,
    menu: Option<(MenuKind, Vec<MenuLine>)>,
) -> Scene {
    let pile = &state.seed_pile;
    let config = pile.config();

    let background = catalog.backgrounds.get(&time_of_day).map(|texture| Sprite {
        texture: texture.clone(),
        source: Rect::new(0.0, 0.0, WIN_WIDTH, WIN_HEIGHT),
        dest: Rect::from_min_size(
            BACKGROUND_CENTER - Vec2::new(WIN_WIDTH, WIN_HEIGHT) * BACKGROUND_SCALE / 2.0,
            Vec2::new(WIN_WIDTH, WIN_HEIGHT) * BACKGROUND_SCALE,
        ),
        flip_x: false,
    });

    let fill = pile.fill_rect();
    let seed = catalog.seed_images.get(&time_of_day).map(|texture| {
        let size = fill.size() * config.draw_scale;
        Sprite {
            texture: texture.clone(),
            source: fill,
            dest: Rect::from_min_size(config.draw_offset - size / 2.0, size),
            flip_x: false,
        }
    });

    let mut birds: Vec<BirdSprite> = state
        .birds
        .iter()
        .filter_map(|bird| {
            let sheet = catalog.sheet(bird.species)?;
            let source = sheet.frames.current(&bird.animation)?;
            Some(BirdSprite {
                bird: bird.id,
                flying: bird.state().is_flying(),
                sprite: Sprite {
                    texture: sheet.path.clone(),
                    source,
                    dest: bird.body.rect,
                    flip_x: bird.animation.facing() == Facing::Left,
                },
            })
        })
        .collect();
    // Stable, so id order holds inside each group
    birds.sort_by_key(|b| b.flying);

    let (menu, menu_lines) = match menu {
        Some((kind, lines)) => (Some(kind), lines),
        None => (None, Vec::new()),
    };

    Scene {
        camera: config.center,
        time_of_day,
        background,
        seed,
        birds,
        menu,
        menu_lines,
    }
}

/// Draws nothing; sheet sizes come from PNG headers
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    last_scene: Option<Scene>,
}

impl HeadlessRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_scene(&self) -> Option<&Scene> {
        self.last_scene.as_ref()
    }
}

impl Renderer for HeadlessRenderer {
    fn load_sheet(&mut self, path: &Path) -> Result<SheetInfo, AssetError> {
        read_png_size(path)
    }

    fn present(&mut self, scene: &Scene) {
        self.frames += 1;
        log::trace!(
            "Frame {}: {} birds, menu {:?}",
            self.frames,
            scene.birds.len(),
            scene.menu
        );
        self.last_scene = Some(scene.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::test_support::write_assets;
    use crate::consts::SIM_DT;
    use crate::context::FeederContext;
    use crate::sim::{TickInput, TimeLength, tick};
    use tempfile::TempDir;

    #[test]
    fn test_flying_birds_drawn_last() {
        let dir = TempDir::new().unwrap();
        let context = FeederContext::backyard_sunflower();
        write_assets(dir.path(), &context);
        let mut renderer = HeadlessRenderer::default();
        let catalog = AssetCatalog::load(&context, dir.path(), &mut renderer).unwrap();

        // Only the shortest durations, so birds come and go quickly
        let mut fast = context.clone();
        fast.timing.time_likelihoods = [(TimeLength::VeryShort, 1)].into_iter().collect();
        let mut state = FeederState::new(fast, 4);
        let input = TickInput::default();
        let mut saw_birds = false;
        for _ in 0..(60 * 200) {
            tick(&mut state, &input, SIM_DT);
            let scene = build_scene(&state, &catalog, TimeOfDay::Day, None);
            assert_eq!(scene.birds.len(), state.birds.len());
            let first_flying = scene.birds.iter().position(|b| b.flying).unwrap_or(scene.birds.len());
            assert!(scene.birds[first_flying..].iter().all(|b| b.flying));
            saw_birds |= !scene.birds.is_empty();
        }
        assert!(saw_birds);
    }

    #[test]
    fn test_scene_layers_follow_time_of_day() {
        let dir = TempDir::new().unwrap();
        let context = FeederContext::backyard_sunflower();
        write_assets(dir.path(), &context);
        let mut renderer = HeadlessRenderer::default();
        let catalog = AssetCatalog::load(&context, dir.path(), &mut renderer).unwrap();
        let state = FeederState::new(context.clone(), 4);

        let scene = build_scene(&state, &catalog, TimeOfDay::Night, None);
        let background = scene.background.unwrap();
        assert!(background.texture.ends_with(context.background_image(TimeOfDay::Night).unwrap()));
        assert_eq!(background.dest.size(), Vec2::new(2000.0, 1125.0));
        let seed = scene.seed.unwrap();
        assert_eq!(seed.source, state.seed_pile.fill_rect());
        assert_eq!(scene.camera, Vec2::ZERO);
        assert!(scene.menu_lines.is_empty());

        renderer.present(&scene_with_menu());
        assert_eq!(renderer.frames(), 1);
        assert_eq!(renderer.last_scene().unwrap().menu, Some(MenuKind::Pause));
    }

    fn scene_with_menu() -> Scene {
        Scene {
            menu: Some(MenuKind::Pause),
            ..Default::default()
        }
    }
}
