use spirit_core::input::FrameInput;
use spirit_core::sim_trait::Simulation;
use spirit_core::time::TickClock;

use crate::config::PlatformerConfig;
use crate::{Level, LevelData, LevelError, LevelEvent};

/// Ordered supply of level descriptions.
pub trait LevelSource {
    fn level_count(&self) -> usize;

    fn load(&self, index: usize) -> Result<LevelData, LevelError>;
}

impl LevelSource for Vec<LevelData> {
    fn level_count(&self) -> usize {
        self.len()
    }

    fn load(&self, index: usize) -> Result<LevelData, LevelError> {
        self.get(index).cloned().ok_or(LevelError::UnknownLevel(index))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CampaignError {
    NoLevels,
    Level { index: usize, error: LevelError },
}

impl std::fmt::Display for CampaignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLevels => write!(f, "campaign has no levels"),
            Self::Level { index, error } => write!(f, "level {index}: {error}"),
        }
    }
}

impl std::error::Error for CampaignError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoLevels => None,
            Self::Level { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CampaignEvent {
    Level(LevelEvent),
    /// A level was (re)loaded after a continue.
    LevelLoaded { index: usize },
}

/// Level progression: play a level, then continue to the next one, retry it,
/// or respawn, depending on how it ended.
pub struct Campaign<S: LevelSource> {
    source: S,
    config: PlatformerConfig,
    seed: u64,
    index: usize,
    level: Level,
    paused: bool,
    continue_was_pressed: bool,
}

impl<S: LevelSource> Campaign<S> {
    pub fn new(source: S, config: PlatformerConfig, seed: u64) -> Result<Self, CampaignError> {
        if source.level_count() == 0 {
            return Err(CampaignError::NoLevels);
        }
        let level = Self::build(&source, &config, seed, 0)?;
        Ok(Self {
            source,
            config,
            seed,
            index: 0,
            level,
            paused: false,
            continue_was_pressed: false,
        })
    }

    fn build(source: &S, config: &PlatformerConfig, seed: u64, index: usize) -> Result<Level, CampaignError> {
        source
            .load(index)
            .and_then(|data| Level::new(data, config.clone(), seed.wrapping_add(index as u64)))
            .map_err(|error| CampaignError::Level { index, error })
    }

    fn load(&mut self, index: usize) -> Result<CampaignEvent, CampaignError> {
        self.level = Self::build(&self.source, &self.config, self.seed, index)?;
        self.index = index;
        tracing::info!(index, "campaign level loaded");
        Ok(CampaignEvent::LevelLoaded { index })
    }

    /// Advance one tick. `continue_pressed` is the raw button state; only the
    /// press edge acts.
    pub fn update(
        &mut self,
        clock: TickClock,
        input: &FrameInput,
        continue_pressed: bool,
    ) -> Result<Vec<CampaignEvent>, CampaignError> {
        let continue_edge = continue_pressed && !self.continue_was_pressed;
        self.continue_was_pressed = continue_pressed;
        if self.paused {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        if continue_edge {
            if !self.level.player_alive() {
                events.push(self.load(self.index)?);
            } else if self.level.time_remaining() <= 0.0 {
                let next = if self.level.reached_exit() {
                    (self.index + 1) % self.source.level_count()
                } else {
                    self.index
                };
                events.push(self.load(next)?);
            }
        }

        events.extend(self.level.update(clock, input).into_iter().map(CampaignEvent::Level));
        Ok(events)
    }

    /// Back to the first level.
    pub fn reset(&mut self) -> Result<CampaignEvent, CampaignError> {
        self.paused = false;
        self.load(0)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn level_count(&self) -> usize {
        self.source.level_count()
    }
}
