//! Orbit demo
//!
//! Drives the scene runtime headlessly: a small solar system of randomly
//! placed planets plus a second scene with a pulsing torus knot. A host loop
//! answers frame requests at 60 Hz and logs what the backend was asked to draw.
//!
//! Pass a `.toml` or `.ron` runtime config path as the first argument to
//! override the defaults.

use std::time::Duration;

use rand::prelude::*;
use scene_runtime::engine::DrawLog;
use scene_runtime::foundation::logging;
use scene_runtime::node::NodeError;
use scene_runtime::registry::{EntityDescriptor, EntityShape};
use scene_runtime::prelude::*;

const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);
const TOTAL_FRAMES: u32 = 300;
const PLANET_COUNT: usize = 5;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Config(#[from] scene_runtime::config::ConfigError),
}

fn build_solar_system(runtime: &Runtime, rng: &mut impl Rng) -> Result<Scene, DemoError> {
    let scene = runtime.scene();

    let sun = runtime.entity("sphere", &[1.0])?.color(&args![1.0, 0.8, 0.2])?;
    let sunlight = runtime.entity("point_light", &[f64::from(0xfff2cc_u32), 2.0])?;
    scene.add(&[sun, sunlight]);

    for index in 0..PLANET_COUNT {
        let radius = rng.gen_range(0.1..0.4);
        let distance = 2.0 + index as f64 * 1.2;
        let period = rng.gen_range(4.0..12.0);
        let tilt = rng.gen_range(-0.05..0.05);

        let planet = runtime
            .entity("sphere", &[radius])?
            .color(&args![rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()])?
            .translate(&args![distance])?
            .rotate(&args![tilt, rng.gen::<f64>(), 0, 0, 1.0 / period])?;
        log::info!(
            "Planet {} at distance {:.1} (radius {:.2}, period {:.1}s)",
            index,
            distance,
            radius,
            period
        );
        scene.add(&[planet]);
    }

    let camera = runtime
        .camera(Some(60.0))
        .translate(&args![0, 6, 12])?
        .look_at(&args![0, 0, 0])?;
    scene.render(Some(&camera))?;
    Ok(scene)
}

fn build_knot(runtime: &Runtime) -> Result<Scene, DemoError> {
    let scene = runtime.scene();
    let pulse = Value::dynamic(|frame| 0.5 + 0.5 * (frame.time * std::f64::consts::TAU).sin());

    let knot = runtime
        .entity("torus_knot", &[1.0, 0.3])?
        .color(&[pulse, Value::from(0.2), Value::from(0.8)])?
        .scale(&args![Value::dynamic(|frame| 1.0 + 0.2 * frame.time.cos())])?
        .rotate(&args![0, 0, 0, 0.1, 0.25])?;
    let light = runtime.entity("directional_light", &[])?.translate(&args![3, 3, 3])?;

    scene.add(&[knot, light]);
    scene.render(None)?;
    Ok(scene)
}

fn report(draws: &DrawLog, scene: &Scene, label: &str) {
    let Some(last) = draws.last_draw_of(scene.id()) else {
        log::info!("{label}: never drawn");
        return;
    };
    log::info!("{label}: {} draws, {} objects", draws.draws_of(scene.id()), last.objects.len());
    for (index, object) in last.objects.iter().enumerate() {
        let p = object.pose.position;
        log::info!("  [{index}] {} at ({:.2}, {:.2}, {:.2})", object.kind(), p.x, p.y, p.z);
    }
}

fn names_of(descriptors: &[&EntityDescriptor]) -> String {
    descriptors
        .iter()
        .map(|descriptor| descriptor.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn run() -> Result<(), DemoError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading runtime config from {path}");
            RuntimeConfig::load_from_file(&path)?
        }
        None => RuntimeConfig::default(),
    };

    let signal = FrameSignal::new();
    let backend = HeadlessBackend::new();
    let draws = backend.log();
    let runtime = Runtime::new(RenderSurface::new(1280, 720), backend, signal.clone(), config)?;
    let (lights, meshes): (Vec<_>, Vec<_>) = runtime
        .registry()
        .descriptors()
        .partition(|descriptor| descriptor.shape == EntityShape::Light);
    log::info!("Available meshes: {}", names_of(&meshes));
    log::info!("Available lights: {}", names_of(&lights));

    let mut rng = thread_rng();
    let system = build_solar_system(&runtime, &mut rng)?;
    let knot = build_knot(&runtime)?;

    let mut timestamp = Duration::ZERO;
    for frame in 0..TOTAL_FRAMES {
        if !signal.take() {
            log::info!("No frame requested; host loop idle at frame {frame}");
            break;
        }
        runtime.on_frame(timestamp);
        timestamp += FRAME_INTERVAL;

        match frame {
            120 => {
                log::info!("Stopping knot scene at t={:.2}s", runtime.time());
                knot.stop();
            }
            180 => runtime.set_resolution(1920, 1080),
            _ => {}
        }
    }

    for fault in runtime.take_faults() {
        log::warn!("Fault in {:?} at t={:.2}s: {}", fault.scene, fault.time, fault.message);
    }
    report(&draws, &system, "Solar system");
    report(&draws, &knot, "Knot");
    log::info!(
        "Ran {} frames, synthesized time {:.2}s, {} draws total",
        runtime.frame_count(),
        runtime.time(),
        draws.draw_count()
    );

    system.dispose();
    knot.dispose();
    runtime.dispose();
    Ok(())
}

fn main() {
    logging::init();

    log::info!("Starting orbit demo");
    if let Err(err) = run() {
        log::error!("Orbit demo failed: {err}");
        std::process::exit(1);
    }
    log::info!("Orbit demo finished");
}
