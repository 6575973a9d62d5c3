use std::env;
use std::path::PathBuf;

const DEFAULT_WORDS_PATH: &str = "words_config.json";
const DEFAULT_SCORES_PATH: &str = "highscores.json";
const DEFAULT_LOG_PATH: &str = "falling-words.log";

/// Tuning numbers for one game session. Distances are in virtual pixels and
/// speeds in pixels per tick.
#[derive(Debug, Clone)]
pub struct GameConfig
{
    pub total_words_to_win: u32,
    pub speed_increase_per_word: f32,
    pub max_words_on_screen: usize,
    pub initial_words: usize,
    pub spawn_delay_ms: u64,
    pub backspace_delay_ms: u64,
    pub backspace_interval_ms: u64,
    pub min_word_length: usize,
    pub deceleration_rate: f32,
    pub lag_spawn_threshold: u32,
    pub lag_ms: u64,
    pub screen_width: f32,
    pub screen_height: f32,
    pub tick_ms: u64,
    pub expiry_margin: f32,
    pub spawn_x_min: i32,
    pub spawn_x_reserve: i32,
    pub spawn_y_min: i32,
    pub spawn_y_max: i32,
}

impl Default for GameConfig
{
    fn default() -> Self
    {
        Self {
            total_words_to_win: 30,
            speed_increase_per_word: 0.02,
            max_words_on_screen: 10,
            initial_words: 1,
            spawn_delay_ms: 2000,
            backspace_delay_ms: 150,
            backspace_interval_ms: 50,
            min_word_length: 3,
            deceleration_rate: 1.0,
            lag_spawn_threshold: 4,
            lag_ms: 5000,
            screen_width: 900.0,
            screen_height: 650.0,
            tick_ms: 16,
            expiry_margin: 100.0,
            spawn_x_min: 10,
            spawn_x_reserve: 200,
            spawn_y_min: 10,
            spawn_y_max: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty
{
    #[default]
    Beginner,
    Standard,
    Expert,
}

impl Difficulty
{
    pub fn name(self) -> &'static str
    {
        match self {
            Difficulty::Beginner => "BEGINNER",
            Difficulty::Standard => "STANDARD",
            Difficulty::Expert => "EXPERT",
        }
    }

    /// Base fall speed in pixels per tick.
    pub fn base_speed(self) -> f32
    {
        match self {
            Difficulty::Beginner => 1.0,
            Difficulty::Standard => 1.5,
            Difficulty::Expert => 2.0,
        }
    }

    pub fn next(self) -> Self
    {
        match self {
            Difficulty::Beginner => Difficulty::Standard,
            Difficulty::Standard => Difficulty::Expert,
            Difficulty::Expert => Difficulty::Beginner,
        }
    }
}

/// File locations, overridable through the environment.
#[derive(Debug, Clone)]
pub struct AppPaths
{
    pub words: PathBuf,
    pub scores: PathBuf,
    pub log: PathBuf,
}

impl AppPaths
{
    pub fn from_env() -> Self
    {
        Self {
            words: path_from_env("FALLING_WORDS_CONFIG", DEFAULT_WORDS_PATH),
            scores: path_from_env("FALLING_WORDS_SCORES", DEFAULT_SCORES_PATH),
            log: path_from_env("FALLING_WORDS_LOG", DEFAULT_LOG_PATH),
        }
    }
}

fn path_from_env(key: &str, default: &str) -> PathBuf
{
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_difficulty_cycle_wraps()
    {
        let mut difficulty = Difficulty::default();
        for _ in 0..3 {
            difficulty = difficulty.next();
        }
        assert_eq!(difficulty, Difficulty::Beginner);
        assert_eq!(Difficulty::Standard.next(), Difficulty::Expert);
    }

    #[test]
    fn test_difficulty_names_and_speeds()
    {
        assert_eq!(Difficulty::default().name(), "BEGINNER");
        assert_eq!(Difficulty::Expert.name(), "EXPERT");
        assert_eq!(Difficulty::Standard.base_speed(), 1.5);
    }

    #[test]
    fn test_default_tuning()
    {
        let config = GameConfig::default();
        assert_eq!(config.total_words_to_win, 30);
        assert_eq!(config.max_words_on_screen, 10);
        assert_eq!(config.lag_spawn_threshold, 4);
        assert_eq!(config.lag_ms, 5000);
    }
}
