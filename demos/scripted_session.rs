//! # Scripted Session
//!
//! Drives an AR session without a window: the platform side is played by
//! channel-backed sensors and a scripted list of pointer samples.
//!
//! Run with `RUST_LOG=debug cargo run --example scripted_session` to watch the
//! gesture and sensor logging.

use anyhow::Context;
use cgmath::{Vector3, Zero};
use evar::prelude::*;

/// Flat table top half a metre up, reported for every screen point
struct TableTop;

impl PlaneSource for TableTop {
    fn raycast(&mut self, x: f32, _y: f32, _camera: &CameraPose) -> Vec<PlaneHit> {
        vec![PlaneHit::new(
            Vector3::new((x - 0.5) * 2.0, 0.5, 0.0),
            Vector3::unit_y(),
            PolygonId(1),
        )]
    }
}

struct AllowCamera;

impl CameraAccess for AllowCamera {
    fn request(&mut self) -> ArResult<()> {
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ArConfig::default().with_scale_range(ScaleRange::native());
    let mut session = ArSession::new(config, Viewport::new(1080.0, 1920.0), Box::new(TableTop))
        .context("building AR session")?;

    let (ambient, ambient_feed) = ChannelSource::<AmbientSample>::new(SensorKind::AmbientLight);
    let orientation =
        ChannelSource::<OrientationSample>::denied(SensorKind::Orientation, "user declined");
    session.activate(
        SensorSet::default()
            .with_camera(Box::new(AllowCamera))
            .with_ambient_light(Box::new(ambient))
            .with_orientation(Box::new(orientation)),
        &LocalClock,
    );
    log::info!("AR mode: {}", session.ar_mode());

    let camera = CameraPose::look_at(Vector3::new(0.0, 1.6, 1.5), Vector3::zero(), Vector3::unit_y())
        .with_aspect(1080.0 / 1920.0);
    let frame = FrameInput::new(camera, 1.0 / 60.0);

    let preview = session.tick(&frame);
    if let Some(reticle) = preview.reticle {
        log::info!("reticle at {:?}", reticle.position);
    }

    // Tap slightly right of centre.
    let pointers = session.pointers_mut();
    pointers.push(PointerSample::new(1, 0.6, 0.5, PointerPhase::Down, 0));
    pointers.push(PointerSample::new(1, 0.6, 0.5, PointerPhase::Up, 90));
    let placed = session.tick(&frame);
    let pose = placed.anchor.context("tap did not place the anchor")?;
    log::info!("placed at {:?}", pose.position);

    // Pinch out while twisting.
    let pointers = session.pointers_mut();
    pointers.push(PointerSample::new(1, 0.4, 0.5, PointerPhase::Down, 1000));
    pointers.push(PointerSample::new(2, 0.6, 0.5, PointerPhase::Down, 1000));
    session.tick(&frame);
    for step in 1..=10u64 {
        let spread = 0.1 + 0.01 * step as f32;
        let lift = 0.005 * step as f32;
        let pointers = session.pointers_mut();
        pointers.push(PointerSample::new(1, 0.5 - spread, 0.5 + lift, PointerPhase::Move, 1000 + step * 16));
        pointers.push(PointerSample::new(2, 0.5 + spread, 0.5 - lift, PointerPhase::Move, 1000 + step * 16));
        session.tick(&frame);
    }
    log::info!("scale after pinch: {:.2}", session.anchor().scale());

    ambient_feed.publish(AmbientSample {
        color_temperature_k: Some(3200.0),
        ..AmbientSample::illuminance(320.0)
    });
    let lit = session.tick(&frame);
    if let Some(estimate) = lit.light_estimate {
        log::info!(
            "light intensity {:.2}, colour {:?}",
            estimate.intensity,
            estimate.color
        );
    }

    session.deactivate();
    log::info!(
        "ambient feed active after deactivate: {}",
        ambient_feed.is_active()
    );
    Ok(())
}
