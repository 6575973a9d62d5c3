use crate::config::{Difficulty, GameConfig};
use crate::game::backspace::BackspaceRepeat;
use crate::game::word::{FallingWord, effective_base_speed};
use crate::notify::{Notifier, Signal};
use crate::scores::ScoreLedger;
use crate::words::WordSource;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

const FALLBACK_WORD: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase
{
    Playing,
    Victory,
    GameOver,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats
{
    pub score: u32,
    pub words_typed: u32,
    pub words_spawned: u32,
    pub total_missed: u32,
    pub total_attempts: u32,
    pub perfect_words: u32,
}

impl Stats
{
    /// Percentage of finished words that were typed rather than missed.
    pub fn accuracy(&self) -> f64
    {
        let total = self.words_typed + self.total_missed;
        if total == 0 {
            return 0.0;
        }
        self.words_typed as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default)]
struct SpawnTimer
{
    last_spawn_ms: u64,
    spawn_delay_ms: u64,
    lag_end_ms: u64,
    spawned_since_lag: u32,
}

/// Read-only view handed to the renderer once per frame.
#[derive(Debug, Clone, Copy)]
pub struct SessionSnapshot<'a>
{
    pub words: &'a [FallingWord],
    pub input: &'a str,
    pub stats: Stats,
    pub phase: Phase,
    pub is_new_high_score: bool,
    pub level: &'a str,
    pub difficulty: Difficulty,
    pub current_speed: f32,
    pub total_words_to_win: u32,
}

impl SessionSnapshot<'_>
{
    pub fn accuracy(&self) -> Option<f64>
    {
        (self.stats.words_typed + self.stats.total_missed > 0).then(|| self.stats.accuracy())
    }
}

pub struct GameSession<N: Notifier>
{
    config: GameConfig,
    words: WordSource,
    ledger: ScoreLedger,
    notifier: N,
    rng: StdRng,
    difficulty: Difficulty,
    active: Vec<FallingWord>,
    input: String,
    stats: Stats,
    phase: Phase,
    made_mistake: bool,
    is_new_high_score: bool,
    spawn: SpawnTimer,
    backspace: BackspaceRepeat,
}

impl<N: Notifier> GameSession<N>
{
    pub fn new(
        config: GameConfig,
        words: WordSource,
        ledger: ScoreLedger,
        notifier: N,
        seed: u64,
        now_ms: u64,
    ) -> Self
    {
        let backspace = BackspaceRepeat::new(config.backspace_delay_ms, config.backspace_interval_ms);
        let mut session = Self {
            config,
            words,
            ledger,
            notifier,
            rng: StdRng::seed_from_u64(seed),
            difficulty: Difficulty::default(),
            active: Vec::new(),
            input: String::new(),
            stats: Stats::default(),
            phase: Phase::Playing,
            made_mistake: false,
            is_new_high_score: false,
            spawn: SpawnTimer::default(),
            backspace,
        };
        session.reset(now_ms);
        session
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_>
    {
        SessionSnapshot {
            words: &self.active,
            input: &self.input,
            stats: self.stats,
            phase: self.phase,
            is_new_high_score: self.is_new_high_score,
            level: self.words.current_level(),
            difficulty: self.difficulty,
            current_speed: effective_base_speed(
                &self.config,
                self.difficulty.base_speed(),
                self.stats.words_typed,
            ),
            total_words_to_win: self.config.total_words_to_win,
        }
    }

    pub fn config(&self) -> &GameConfig
    {
        &self.config
    }

    pub fn ledger(&self) -> &ScoreLedger
    {
        &self.ledger
    }

    pub fn reset(&mut self, now_ms: u64)
    {
        self.active.clear();
        self.input.clear();
        self.stats = Stats::default();
        self.phase = Phase::Playing;
        self.made_mistake = false;
        self.is_new_high_score = false;
        self.spawn = SpawnTimer {
            last_spawn_ms: now_ms,
            spawn_delay_ms: self.config.spawn_delay_ms,
            lag_end_ms: 0,
            spawned_since_lag: 0,
        };
        self.backspace.release();

        for _ in 0..self.config.initial_words {
            self.spawn_word(now_ms);
        }
        debug!(
            "Session reset: level {}, difficulty {}",
            self.words.current_level(),
            self.difficulty.name()
        );
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty, now_ms: u64)
    {
        self.difficulty = difficulty;
        self.reset(now_ms);
    }

    pub fn cycle_difficulty(&mut self, now_ms: u64) -> Difficulty
    {
        self.set_difficulty(self.difficulty.next(), now_ms);
        self.difficulty
    }

    pub fn cycle_level(&mut self, now_ms: u64) -> String
    {
        let level = self.words.cycle_level();
        info!("Switched to level {level}");
        self.reset(now_ms);
        level
    }

    pub fn append_char(&mut self, ch: char)
    {
        if self.phase != Phase::Playing || ch.is_control() {
            return;
        }
        self.input.push(ch);
    }

    /// Removes the last typed character. Counts as a mistake for the
    /// perfect-word bonus even when there was nothing to remove.
    pub fn backspace(&mut self)
    {
        if self.phase != Phase::Playing {
            return;
        }
        self.input.pop();
        self.made_mistake = true;
    }

    pub fn press_backspace(&mut self, now_ms: u64)
    {
        if self.phase != Phase::Playing {
            return;
        }
        if self.backspace.press(now_ms) {
            self.backspace();
        }
    }

    pub fn release_backspace(&mut self)
    {
        self.backspace.release();
    }

    pub fn clear_input(&mut self)
    {
        if self.phase != Phase::Playing {
            return;
        }
        self.input.clear();
        self.made_mistake = true;
        self.notifier.notify(Signal::Incorrect);
    }

    /// Matches the input against the falling words. Returns whether a word
    /// was hit.
    pub fn submit_word(&mut self, now_ms: u64) -> bool
    {
        if self.phase != Phase::Playing {
            return false;
        }

        let Some(index) = self.active.iter().position(|word| word.matches(&self.input)) else {
            self.input.clear();
            self.made_mistake = true;
            self.notifier.notify(Signal::Incorrect);
            return false;
        };

        let word = self.active.remove(index);
        self.stats.words_typed += 1;
        self.notifier.notify(Signal::Correct);
        if self.made_mistake {
            self.stats.score += 1;
        } else {
            self.stats.score += 2;
            self.stats.perfect_words += 1;
        }
        debug!("Typed '{}', score {}", word.text, self.stats.score);

        self.input.clear();
        self.made_mistake = false;

        if !self.is_lagging(now_ms) {
            self.spawn_word(now_ms);
        }

        if self.stats.score >= self.config.total_words_to_win {
            self.finish(Phase::Victory);
        }
        true
    }

    pub fn tick(&mut self, now_ms: u64)
    {
        if self.phase != Phase::Playing {
            return;
        }

        for _ in 0..self.backspace.due(now_ms) {
            self.input.pop();
        }

        if now_ms.saturating_sub(self.spawn.last_spawn_ms) > self.spawn.spawn_delay_ms
            && self.active.len() < self.config.max_words_on_screen
            && !self.is_lagging(now_ms)
        {
            self.spawn_word(now_ms);
            self.spawn.last_spawn_ms = now_ms;
        }

        for word in &mut self.active {
            word.advance();
        }
        let (expired, remaining): (Vec<FallingWord>, Vec<FallingWord>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|word| word.is_expired(&self.config));
        self.active = remaining;

        let cap = self.config.max_words_on_screen * 2;
        // Expired words still waiting in this pass count towards the cap.
        let mut pending = expired.len();
        for word in expired {
            pending -= 1;
            debug!("Missed '{}'", word.text);
            self.stats.total_missed += 1;
            self.stats.total_attempts += 1;
            self.notifier.notify(Signal::Miss);

            if self.active.len() + pending < cap && !self.is_lagging(now_ms) {
                self.spawn_word(now_ms);
            }
        }

        if self.active.len() > cap {
            self.finish(Phase::GameOver);
        }
    }

    fn is_lagging(&self, now_ms: u64) -> bool
    {
        now_ms <= self.spawn.lag_end_ms
    }

    fn spawn_word(&mut self, now_ms: u64)
    {
        let text = match self.words.get_word(&mut self.rng) {
            Ok(text) => text.to_string(),
            Err(err) => {
                warn!("{err}, spawning '{FALLBACK_WORD}'");
                FALLBACK_WORD.to_string()
            }
        };
        let word = FallingWord::spawn(
            &mut self.rng,
            &text,
            &self.config,
            self.difficulty.base_speed(),
            self.stats.words_typed,
        );
        self.active.push(word);
        self.stats.words_spawned += 1;
        self.stats.total_attempts += 1;

        self.spawn.spawned_since_lag += 1;
        if self.spawn.spawned_since_lag >= self.config.lag_spawn_threshold {
            self.spawn.lag_end_ms = now_ms + self.config.lag_ms;
            self.spawn.spawned_since_lag = 0;
            debug!("Spawning paused until {} ms", self.spawn.lag_end_ms);
        }
    }

    fn finish(&mut self, phase: Phase)
    {
        self.phase = phase;
        self.backspace.release();

        let accuracy = self.stats.accuracy();
        self.is_new_high_score = self.ledger.update(
            self.words.current_level(),
            self.difficulty.name(),
            accuracy,
            self.stats.perfect_words,
        );
        info!(
            "Session finished ({phase:?}): score {}, accuracy {accuracy:.1}%, perfects {}",
            self.stats.score, self.stats.perfect_words
        );

        let signal = match phase {
            Phase::Victory => Signal::Victory,
            _ if accuracy >= 50.0 => Signal::GameOverGood,
            _ => Signal::GameOverBad,
        };
        self.notifier.notify(signal);
    }
}
