//! Headless Ripple Demo
//!
//! Drives two ripples on a simulated button at 60 fps and prints the
//! overlay's scale and opacity as they evolve.
//!
//! Features demonstrated:
//! - Loading house-style defaults from TOML
//! - A plain ripple that fades out while growing
//! - A hold ripple whose outcome is flipped by a (simulated) gesture
//!   recognizer before the decision point
//!
//! Run with: cargo run -p ripple_effect --example headless_ripple

use anyhow::{Context, Result};
use ripple_animation::AnimationScheduler;
use ripple_core::{Color, Point, Rect, SharedViewTree, ViewId, ViewTree};
use ripple_effect::{
    DecisionBranch, OutcomeFlag, RippleConfiguration, RippleController, RippleDefaults,
    RippleSession,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FRAME_MS: f64 = 1000.0 / 60.0;

const HOUSE_STYLE: &str = r#"
clips_to_bounds = true
scale_duration = 0.45
fade_duration = 0.6
easing = "ease-out"
"#;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple_effect=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let defaults =
        RippleDefaults::from_toml_str(HOUSE_STYLE).context("invalid ripple defaults")?;

    let scheduler = AnimationScheduler::new();
    let views = ViewTree::shared();
    let button = views
        .lock()
        .map_err(|_| anyhow::anyhow!("view tree poisoned"))?
        .create_root(Rect::new(0.0, 0.0, 240.0, 48.0));
    let controller = RippleController::new(views.clone(), scheduler.handle());

    // Tap: plain ripple from where the finger landed
    let tap = RippleConfiguration::builder_with(Color::from_hex(0x6200EE), &defaults)
        .start_point(Point::new(32.0, 20.0))
        .build()?;
    let session = controller.animate(button, &tap, |_| println!("tap ripple done"))?;
    run_frames(&scheduler, &views, &session)?;

    // Long press: the recognizer reports failure before the decision point
    let hold = RippleConfiguration::builder_with(Color::from_hex(0x03DAC6), &defaults)
        .start_point(Point::new(200.0, 10.0))
        .decision(DecisionBranch::new(0.25, 0.6, 0.9))
        .build()?;
    let recognizer = OutcomeFlag::default();
    let session = controller.animate_with_outcome(
        button,
        &hold,
        recognizer.clone(),
        |succeeded| println!("hold ripple done, succeeded: {}", succeeded),
    )?;

    scheduler.advance(100.0);
    recognizer.set(false);
    run_frames(&scheduler, &views, &session)?;

    let remaining = children(&views, button)?;
    println!("overlays left on the button: {}", remaining);
    Ok(())
}

fn run_frames(
    scheduler: &AnimationScheduler,
    views: &SharedViewTree,
    session: &RippleSession,
) -> Result<()> {
    let mut frame = 0;
    while !session.is_finished() {
        scheduler.advance(FRAME_MS);
        frame += 1;

        let tree = views
            .lock()
            .map_err(|_| anyhow::anyhow!("view tree poisoned"))?;
        match tree.get(session.overlay()) {
            Some(node) if frame % 6 == 0 => println!(
                "frame {:>3}: scale {:>7.2} opacity {:.2}",
                frame,
                node.transform().scale_x(),
                node.opacity()
            ),
            Some(_) => {}
            None => println!("frame {:>3}: overlay detached", frame),
        }
    }
    Ok(())
}

fn children(views: &SharedViewTree, host: ViewId) -> Result<usize> {
    let tree = views
        .lock()
        .map_err(|_| anyhow::anyhow!("view tree poisoned"))?;
    Ok(tree.children(host).len())
}
