use tracing::{info, Level};

use summit_duel::config::ArenaConfig;
use summit_duel::game::input::InputState;
use summit_duel::game::session::Session;
use summit_duel::persist::{JsonDirSink, SummaryCache, SummaryRelay};

/// Headless session runner: drives one scripted session to completion
/// and hands the summary to the persistence relay. Stands in for the
/// browser host during development.
fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Summit Duel core v{}", env!("CARGO_PKG_VERSION"));

    let config = ArenaConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: max_ticks={}, seed={:?}",
        config.session.max_ticks, config.session.seed
    );

    let cache_dir = config.persist.cache_dir.clone();
    let relay = SummaryRelay::new(
        Box::new(JsonDirSink::new(".summit-duel/summaries")),
        SummaryCache::new(
            &cache_dir,
            config.persist.cache_capacity,
            config.persist.max_cached_file_bytes,
        ),
        config.persist.relay_capacity,
    );

    let max_ticks = config.session.max_ticks;
    let mut session = Session::new(config);

    // Scripted attract-mode input for the human side
    for i in 0..max_ticks {
        let input = InputState {
            left: i % 120 < 40,
            right: i % 120 >= 80,
            jump: i % 45 == 0,
            shoot: i % 20 == 0,
        };
        session.tick(input);
        if session.is_over() {
            break;
        }
    }

    let snapshot = session.snapshot();
    info!(
        "final frame: {} platforms, {} projectiles, {} particles",
        snapshot.platforms.len(),
        snapshot.projectiles.len(),
        snapshot.particles.len()
    );

    let summary = session.finish();
    info!(
        "summary: {:?} after {:.1}s, {} shots fired, profile {:?}",
        summary.end, summary.duration_s, summary.shots.fired, summary.profile
    );

    relay.dispatch(summary);
    // Dropping the relay drains the channel and joins the worker
    drop(relay);

    let pending = SummaryCache::new(&cache_dir, usize::MAX, u64::MAX).len();
    if pending > 0 {
        info!("{pending} summaries saved locally, will retry next run");
    }

    Ok(())
}
