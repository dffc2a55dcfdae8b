//! Basic usage example for the timer manager

use std::cell::Cell;

use timerman::{CancellationToken, Duration, TimerContext, TimerDef, TimerDriver, TimerManager, TimerState};

struct Wave {
    remaining: Cell<u32>,
}

fn announce(ctx: &mut TimerContext<'_, '_>) -> bool {
    match ctx.state() {
        TimerState::Starting => println!("Timer {} started ({:?})", ctx.id(), ctx.duration()),
        TimerState::Updating => {}
        TimerState::Stopping => println!("Timer {} finished", ctx.id()),
    }
    false
}

/// Re-arm a new timer from the stop phase until the wave is exhausted
fn next_wave(ctx: &mut TimerContext<'_, '_>) -> bool {
    announce(ctx);
    if let Some(wave) = ctx.data::<Wave>() {
        if wave.remaining.get() > 0 {
            wave.remaining.set(wave.remaining.get() - 1);
            let def = TimerDef::new(ctx.duration())
                .with_data(wave)
                .on_start(announce)
                .on_stop(next_wave);
            if let Err(e) = ctx.add(def) {
                println!("Could not chain next wave: {}", e);
            }
        }
    }
    false
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let wave = Wave {
        remaining: Cell::new(2),
    };
    let frames = Cell::new(0u32);

    let mut manager = TimerManager::new(8, "example_timer_manager")?;

    // Set a few timers
    manager.add(TimerDef::new(Duration::from_millis(300)).on_all(announce))?;
    manager.add(
        TimerDef::new(Duration::from_millis(200))
            .with_data(&wave)
            .on_start(announce)
            .on_stop(next_wave),
    )?;

    // A timer that cancels itself after a few frames
    manager.add(
        TimerDef::new(Duration::from_secs(10))
            .with_bytes(b"short-lived")
            .on_all(|ctx| {
                frames.set(frames.get() + 1);
                if frames.get() == 5 {
                    println!(
                        "Timer {} ({}) cancelled at {:.3}",
                        ctx.id(),
                        String::from_utf8_lossy(ctx.bytes().unwrap_or_default()),
                        ctx.amount()
                    );
                    return true;
                }
                false
            }),
    )?;

    println!("Timers set! Driving until all of them are done...");

    let cancel_token = CancellationToken::new();
    let driver = TimerDriver::new(
        "example_driver".to_string(),
        Duration::from_millis(16), // roughly 60 frames per second
        cancel_token.clone(),
    )
    .with_max_delta(Duration::from_millis(100))
    .with_stop_when_idle(true);

    let ticks = driver.run(&mut manager).await;

    println!("All timers done after {} frames", ticks);
    Ok(())
}
