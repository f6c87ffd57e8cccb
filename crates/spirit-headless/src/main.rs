mod bot;

use spirit_core::time::TickClock;
use tracing_subscriber::EnvFilter;

use spirit_platformer::campaign::{Campaign, CampaignError, CampaignEvent};
use spirit_platformer::config::PlatformerConfig;
use spirit_platformer::level_gen::GeneratedLevels;

use bot::Bot;

const TICK_RATE: f32 = 60.0;

fn main() -> Result<(), CampaignError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seconds = std::env::args()
        .nth(1)
        .and_then(|a| a.strip_prefix("--seconds=").map(String::from))
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(120);

    let seed = std::env::args()
        .nth(2)
        .and_then(|a| a.strip_prefix("--seed=").map(String::from))
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let config = PlatformerConfig::load();
    let source = GeneratedLevels::new(seed, config.generation.clone());
    let mut campaign = Campaign::new(source, config, seed)?;
    tracing::info!(seconds, seed, levels = campaign.level_count(), "Spirit headless run starting");

    let mut bot = Bot::default();
    let mut clock = TickClock::fixed(TICK_RATE);
    let ticks = (seconds as f32 * TICK_RATE) as u64;
    let mut finished = 0u32;
    for _ in 0..ticks {
        let (input, continue_pressed) = bot.decide(campaign.level());
        for event in campaign.update(clock, &input, continue_pressed)? {
            match event {
                CampaignEvent::LevelLoaded { index } => {
                    tracing::info!(index, tick = clock.tick, "level started");
                },
                CampaignEvent::Level(event) => {
                    if event == spirit_platformer::LevelEvent::ExitReached {
                        finished += 1;
                    }
                    tracing::debug!(?event, tick = clock.tick, "level event");
                },
            }
        }
        clock = clock.advanced();
    }

    let level = campaign.level();
    tracing::info!(
        level = campaign.index(),
        score = level.score(),
        time_left = level.time_remaining(),
        exits_reached = finished,
        "Spirit headless run finished"
    );
    Ok(())
}
