//! Planet Flow entry point
//!
//! Handles platform-specific initialization and runs the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent, TouchEvent, WheelEvent};

    use planet_flow::consts::*;
    use planet_flow::renderer::SceneRenderState;
    use planet_flow::platform::{OrbitGesture, PointerTracker};
    use planet_flow::{OrbitCamera, Scene, Settings, platform};

    /// Pixels per wheel notch in DOM_DELTA_PIXEL mode
    const WHEEL_NOTCH: f64 = 100.0;

    /// App instance holding all state
    struct App {
        scene: Scene,
        camera: OrbitCamera,
        render_state: Option<SceneRenderState>,
        last_time: f64,
        /// Pointers currently pressed on the canvas
        pointers: PointerTracker,
    }

    impl App {
        fn new(scene: Scene, camera: OrbitCamera) -> Self {
            Self {
                scene,
                camera,
                render_state: None,
                last_time: 0.0,
                pointers: PointerTracker::new(),
            }
        }

        fn update(&mut self, dt: f32) {
            self.scene.update(dt);
            self.camera.update();
        }

        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.scene, &self.camera) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn apply_gesture(&mut self, gesture: OrbitGesture, height: f32) {
            match gesture {
                OrbitGesture::Rotate(delta) => self.camera.rotate(delta.x, delta.y, height),
                OrbitGesture::Dolly(scale) => self.camera.dolly(scale),
                OrbitGesture::None => {}
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.camera.set_aspect(width, height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }
    }

    /// Size the canvas backing store to its CSS size times the pixel ratio
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Planet Flow starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        let (width, height) = fit_canvas(&canvas);

        let settings = Settings::load();
        log::info!("Settings: {:?}", settings);

        let scene = Scene::new(&settings, platform::time_seed())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let camera = OrbitCamera::new(width as f32 / height as f32, settings.damping_factor);
        let app = Rc::new(RefCell::new(App::new(scene, camera)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let to_js = |e: planet_flow::RenderError| JsValue::from_str(&e.to_string());

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| to_js(e.into()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| to_js(e.into()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = {
            let a = app.borrow();
            SceneRenderState::new(surface, &adapter, width, height, &a.scene, &settings)
                .await
                .map_err(to_js)?
        };
        app.borrow_mut().render_state = Some(render_state);

        setup_resize_handler(&canvas, app.clone());
        setup_input_handlers(&canvas, app.clone());

        request_animation_frame(app);

        log::info!("Planet Flow running!");
        Ok(())
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = fit_canvas(&canvas);
            app.borrow_mut().resize(w, h);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Pointer down: track up to two pointers
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let pos = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                if app.borrow_mut().pointers.down(event.pointer_id(), pos) {
                    let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // One pointer rotates, two pinch
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut a = app.borrow_mut();
                let pos = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                let gesture = a.pointers.moved(event.pointer_id(), pos);
                let height = canvas_clone.client_height() as f32;
                a.apply_gesture(gesture, height);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up
        for name in ["pointerup", "pointercancel"] {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = canvas_clone.release_pointer_capture(event.pointer_id());
                app.borrow_mut().pointers.up(event.pointer_id());
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel zooms
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                let notches = match event.delta_mode() {
                    WheelEvent::DOM_DELTA_PIXEL => event.delta_y() / WHEEL_NOTCH,
                    _ => event.delta_y().signum(),
                };
                // Scrolling down moves the camera away
                app.borrow_mut().camera.zoom(-notches as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keep touch drags from scrolling the page
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            app_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn app_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            // Calculate delta time
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                NOMINAL_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("Planet Flow failed to start: {:?}", e);
    }
}

/// Headless run: `planet-flow [variant|query] [seconds]`, e.g. `planet-flow "variant=orbit&seed=7" 12`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use planet_flow::consts::NOMINAL_DT;
    use planet_flow::{OrbitCamera, Scene, Settings, Variant, platform};

    env_logger::init();
    log::info!("Planet Flow (native) starting...");
    log::info!("Native mode runs the scene without a window - use `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    // A bare variant name is shorthand for `variant=<name>`
    let settings = args
        .next()
        .map(|arg| match Variant::from_str(&arg) {
            Some(variant) => Settings::for_variant(variant),
            None => Settings::from_query(&arg),
        })
        .unwrap_or_default();
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(12.0);

    let mut scene = match Scene::new(&settings, platform::time_seed()) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let mut camera = OrbitCamera::new(16.0 / 9.0, settings.damping_factor);

    let frames = (seconds / NOMINAL_DT).ceil() as u32;
    for _ in 0..frames {
        scene.update(NOMINAL_DT);
        camera.update();
    }

    println!(
        "\n{} after {:.1}s (seed {}): {:?}",
        scene.config.variant.as_str(),
        scene.elapsed,
        scene.seed,
        scene.stats()
    );
    println!("Layout: {:?}", scene.layout.phase);
    for planet in &scene.planets {
        println!("  planet {} at {:.2}", planet.index, planet.position);
    }
    for label in &scene.labels {
        println!(
            "  label '{}' {:?} opacity {:.2}",
            label.spec.text, label.state, label.opacity
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
