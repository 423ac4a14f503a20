use super::assets::ModelData;
use super::camera::PerspectiveCamera;
use super::config::SceneConfig;
use super::graph::{Material, ObjectRole, SceneGraph, SceneObject, TextureData};
use super::pan::{pan_camera_to_point, CameraPan, PanCompletion};
use super::types::{Color, Side, Transform3D, Vec2, Vec3};
use crate::error::SceneResult;
use crate::gpu::primitives::plane;
use crate::gpu::FrameTarget;
use std::rc::Rc;

/// Drawing surface size in CSS pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Map a pointer position to normalized device coordinates (y up)
    pub fn to_ndc(&self, pointer: PointerPosition) -> Option<Vec2> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x = (pointer.x / self.width as f64) * 2.0 - 1.0;
        let y = -(pointer.y / self.height as f64) * 2.0 + 1.0;
        Some(Vec2::new(x as f32, y as f32))
    }
}

/// Pointer position relative to the top-left corner of the drawing surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a click on the scene did
#[must_use]
pub enum ClickOutcome {
    /// The ray hit neither the button nor the table
    Missed,
    /// A pan to the table started
    Hit(PanCompletion),
    /// Something was hit, but a pan is already in flight
    Busy,
}

enum PanState {
    Idle,
    Panning(CameraPan),
}

/// The home page's 3D scene: a table, a ground plane and a clickable
/// billboard that pans the camera down onto the table
pub struct HomeScene<T: FrameTarget> {
    config: SceneConfig,
    camera: PerspectiveCamera,
    graph: SceneGraph,
    target: T,
    viewport: Viewport,
    button: u64,
    table: Option<u64>,
    pan: PanState,
    over_table: bool,
}

impl<T: FrameTarget> HomeScene<T> {
    pub fn new(mut target: T, config: SceneConfig, viewport: Viewport) -> Self {
        let settings = &config.camera;
        let mut camera = PerspectiveCamera::new(settings.fov, viewport.aspect(), settings.near, settings.far);
        camera.look_along(settings.look_direction);
        camera.position = settings.position;

        let mut graph = SceneGraph::new();

        let ground = SceneObject::new(
            ObjectRole::Ground,
            plane(config.ground_size, config.ground_size),
            Material::unlit(config.ground_color).with_side(Side::Double),
        )
        .with_transform(
            Transform3D::from_position(Vec3::new(0.0, config.ground_height, 0.0))
                .with_rotation(config.ground_rotation),
        );
        graph.add(ground);

        // plain white until the outline texture arrives
        let button = SceneObject::new(
            ObjectRole::Button,
            plane(config.button_size, config.button_size),
            Material::lit(Color::white()).transparent(),
        )
        .with_transform(Transform3D::from_position(config.button_position));
        let button = graph.add(button);

        target.resize(viewport.width, viewport.height);

        log::debug!(
            "home scene created: {}x{}, {} objects",
            viewport.width,
            viewport.height,
            graph.draw_order().count()
        );

        Self {
            config,
            camera,
            graph,
            target,
            viewport,
            button,
            table: None,
            pan: PanState::Idle,
            over_table: false,
        }
    }

    /// Place the loaded table model, replacing any previous one
    pub fn attach_table(&mut self, model: ModelData) -> u64 {
        if let Some(old) = self.table.take() {
            self.graph.remove(old);
        }

        let transform = Transform3D::from_position(self.config.table_offset)
            .with_scale(Vec3::splat(self.config.table_scale));
        let material = Material::lit(model.base_color).with_side(model.side);
        let table = SceneObject::new(ObjectRole::Table, model.mesh, material).with_transform(transform);

        log::info!("table attached: {} triangles", table.mesh.triangle_count());

        let id = self.graph.add(table);
        self.table = Some(id);
        id
    }

    pub fn set_button_texture(&mut self, texture: TextureData) {
        log::debug!("button texture attached: {}x{}", texture.width, texture.height);
        self.graph.set_texture(self.button, Rc::new(texture));
    }

    /// One display refresh: face the billboard at the camera, step the pan, draw
    pub fn animate(&mut self, now_ms: f64) -> SceneResult<()> {
        let eye = self.camera.position;
        if let Some(button) = self.graph.get_mut(self.button) {
            button.transform.face_towards(eye);
        }

        if let PanState::Panning(pan) = &mut self.pan {
            if pan.advance(now_ms, &mut self.camera) {
                log::info!("pan finished at fov {:.1}", self.camera.fov);
                self.pan = PanState::Idle;
            }
        }

        self.target.draw(&self.graph, &self.camera)?;
        // a failed frame keeps its pending uploads for the next attempt
        self.graph.clear_dirty();
        Ok(())
    }

    /// Pan the camera onto the table
    ///
    /// While a pan is already running no new one starts; the returned signal
    /// joins the one in flight.
    pub fn pan_to_table(&mut self) -> PanCompletion {
        match &mut self.pan {
            PanState::Panning(pan) => pan.subscribe(),
            PanState::Idle => {
                log::info!("panning to table over {} ms", self.config.pan_duration_ms);
                let mut pan = pan_camera_to_point(
                    &self.camera,
                    self.config.table_view,
                    self.config.pan_duration_ms,
                    self.config.pan_easing,
                );
                let completion = pan.subscribe();
                self.pan = PanState::Panning(pan);
                completion
            }
        }
    }

    pub fn on_click(&mut self, pointer: PointerPosition) -> ClickOutcome {
        let Some(ndc) = self.viewport.to_ndc(pointer) else {
            return ClickOutcome::Missed;
        };

        let ray = self.camera.screen_ray(ndc);
        let candidates: Vec<u64> = std::iter::once(self.button).chain(self.table).collect();
        let hits = self.graph.raycast(&ray, &candidates);

        let Some(nearest) = hits.first() else {
            return ClickOutcome::Missed;
        };

        if self.is_panning() {
            log::debug!("click on object {} ignored, pan in progress", nearest.object_id);
            return ClickOutcome::Busy;
        }

        log::debug!("click hit object {} at {:.3}", nearest.object_id, nearest.distance);
        self.over_table = !self.over_table;
        ClickOutcome::Hit(self.pan_to_table())
    }

    /// Zero-sized viewports (hidden or collapsed canvas) are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Viewport::new(width, height);
        self.camera.set_aspect(width, height);
        self.target.resize(width, height);
    }

    pub fn is_over_table(&self) -> bool {
        self.over_table
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.pan, PanState::Panning(_))
    }
}
