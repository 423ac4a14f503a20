use crate::error::RenderError;
use crate::gpu::{Lighting, Renderer};
use crate::scene::assets::{load_model, load_texture};
use crate::scene::{AnimationLoop, ClickOutcome, HomeScene, PointerPosition, SceneConfig, Viewport};
use gloo::events::{EventListener, EventListenerOptions};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, MouseEvent};
use yew::prelude::*;

type SharedScene = Rc<RefCell<HomeScene<Renderer>>>;

/// Props for the home scene canvas
#[derive(Properties, Clone, PartialEq)]
pub struct SceneCanvasProps {
    #[prop_or_default]
    pub config: SceneConfig,
}

/// Everything that keeps a mounted scene running
///
/// Dropping it stops the frame loop and removes the DOM listeners.
struct SceneSession {
    _scene: SharedScene,
    _frames: AnimationLoop,
    _listeners: Vec<EventListener>,
}

/// Full-viewport canvas showing the home page's 3D scene
#[function_component(SceneCanvas)]
pub fn scene_canvas(props: &SceneCanvasProps) -> Html {
    let canvas_ref = use_node_ref();

    {
        let canvas_ref = canvas_ref.clone();

        // a new config tears the running scene down and builds a fresh one
        use_effect_with(props.config.clone(), move |config| {
            let config = config.clone();
            let session: Rc<RefCell<Option<SceneSession>>> = Rc::new(RefCell::new(None));
            let alive = Rc::new(Cell::new(true));

            if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                let viewport = window_viewport();
                canvas.set_width(viewport.width);
                canvas.set_height(viewport.height);

                let session = session.clone();
                let alive = alive.clone();
                spawn_local(async move {
                    match start_session(canvas, config, viewport).await {
                        Ok(started) if alive.get() => {
                            *session.borrow_mut() = Some(started);
                        }
                        Ok(_) => log::debug!("scene unmounted before the renderer was ready"),
                        Err(e) => log::error!("Failed to create renderer: {}", e),
                    }
                });
            }

            move || {
                alive.set(false);
                let ended = session.borrow_mut().take();
                if ended.is_some() {
                    drop(ended);
                    log::info!("home scene torn down");
                }
            }
        });
    }

    html! {
        <canvas
            ref={canvas_ref}
            style="display: block; width: 100vw; height: 100vh;"
        />
    }
}

async fn start_session(
    canvas: HtmlCanvasElement,
    config: SceneConfig,
    viewport: Viewport,
) -> Result<SceneSession, RenderError> {
    let renderer = Renderer::new(canvas.clone(), Lighting::from(&config)).await?;

    let model_url = config.model_url.clone();
    let texture_url = config.button_texture_url.clone();
    let scene: SharedScene = Rc::new(RefCell::new(HomeScene::new(renderer, config, viewport)));

    let frames = {
        let scene = scene.clone();
        AnimationLoop::start(move |now| {
            if let Err(e) = scene.borrow_mut().animate(now) {
                log::warn!("Frame skipped: {}", e);
            }
        })
    };

    spawn_table_load(Rc::downgrade(&scene), model_url);
    spawn_texture_load(Rc::downgrade(&scene), texture_url);

    let listeners = vec![
        resize_listener(Rc::downgrade(&scene), canvas.clone()),
        click_listener(Rc::downgrade(&scene), canvas),
    ];

    log::info!("home scene running at {}x{}", viewport.width, viewport.height);

    Ok(SceneSession {
        _scene: scene,
        _frames: frames,
        _listeners: listeners,
    })
}

fn spawn_table_load(scene: Weak<RefCell<HomeScene<Renderer>>>, url: String) {
    spawn_local(async move {
        match load_model(&url).await {
            Ok(model) => match scene.upgrade() {
                Some(scene) => {
                    scene.borrow_mut().attach_table(model);
                }
                None => log::debug!("{} loaded after the scene was torn down", url),
            },
            Err(e) => log::error!("Failed to load table model {}: {}", url, e),
        }
    });
}

fn spawn_texture_load(scene: Weak<RefCell<HomeScene<Renderer>>>, url: String) {
    spawn_local(async move {
        match load_texture(&url).await {
            Ok(texture) => {
                if let Some(scene) = scene.upgrade() {
                    scene.borrow_mut().set_button_texture(texture);
                }
            }
            Err(e) => log::error!("Failed to load button texture {}: {}", url, e),
        }
    });
}

fn resize_listener(scene: Weak<RefCell<HomeScene<Renderer>>>, canvas: HtmlCanvasElement) -> EventListener {
    EventListener::new(&gloo_utils::window(), "resize", move |_| {
        let Some(scene) = scene.upgrade() else {
            return;
        };
        let viewport = window_viewport();
        if viewport.width == 0 || viewport.height == 0 {
            return;
        }
        canvas.set_width(viewport.width);
        canvas.set_height(viewport.height);
        scene.borrow_mut().resize(viewport.width, viewport.height);
    })
}

fn click_listener(scene: Weak<RefCell<HomeScene<Renderer>>>, canvas: HtmlCanvasElement) -> EventListener {
    let target = canvas.clone();
    EventListener::new_with_options(
        &target,
        "click",
        EventListenerOptions::run_in_capture_phase(),
        move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let Some(scene) = scene.upgrade() else {
                return;
            };

            let rect = canvas.get_bounding_client_rect();
            let pointer = PointerPosition::new(
                event.client_x() as f64 - rect.left(),
                event.client_y() as f64 - rect.top(),
            );

            let outcome = scene.borrow_mut().on_click(pointer);
            if let ClickOutcome::Hit(completion) = outcome {
                log::debug!("pan started, over table: {}", scene.borrow().is_over_table());
                spawn_local(async move {
                    match completion.await {
                        Ok(()) => log::debug!("camera arrived at the table"),
                        Err(e) => log::debug!("{}", e),
                    }
                });
            }
        },
    )
}

/// Current window size in CSS pixels
fn window_viewport() -> Viewport {
    let window = gloo_utils::window();
    let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(0.0) as u32
    };
    Viewport::new(dimension(window.inner_width()), dimension(window.inner_height()))
}
