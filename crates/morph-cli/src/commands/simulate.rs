use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;

use morph_core::animation::{owner_queue, AnimationHandler, Size, SizeCell};
use morph_core::AnimationOptions;

/// Animate a detached size from `from` to `to`, printing each tick
///
/// The calling task plays the UI thread: it owns the size and runs the
/// writes posted by the animation timer.
pub async fn run(from: Size, to: Size, options: AnimationOptions) -> Result<()> {
    let cell = SizeCell::new(from);
    let (dispatcher, mut queue) = owner_queue();

    let handler = AnimationHandler::new(cell.clone(), to, Arc::new(dispatcher))?
        .with_options(options)?;

    let started = Instant::now();
    let ticks = Arc::new(AtomicU32::new(0));
    let done = Arc::new(AtomicBool::new(false));

    {
        let cell = cell.clone();
        let ticks = ticks.clone();
        handler.on_progress(move |percentage| {
            let tick = ticks.fetch_add(1, Ordering::SeqCst) + 1;
            println!(
                "{:>4}  {:>7.1}ms  {:>11}  {:>5.1}%",
                tick,
                started.elapsed().as_secs_f64() * 1000.0,
                cell.get().to_string(),
                percentage
            );
        });
    }
    {
        let done = done.clone();
        handler.on_end(move || done.store(true, Ordering::SeqCst));
    }

    info!(
        from = %from,
        to = %to,
        interval_ms = options.interval_ms,
        speed_divisor = options.speed_divisor,
        "simulating"
    );
    println!("tick   elapsed       size      progress");

    handler.start()?;

    while !done.load(Ordering::SeqCst) {
        if !queue.run_next().await {
            break;
        }
    }

    println!(
        "\nreached {} in {} ticks ({:.0}ms)",
        cell.get(),
        ticks.load(Ordering::SeqCst),
        started.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
