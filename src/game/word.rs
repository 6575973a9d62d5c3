use crate::config::GameConfig;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct FallingWord
{
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

impl FallingWord
{
    /// Places `text` at a random spot near the top of the screen. Speed grows
    /// with the number of words typed so far and is damped for long words.
    pub fn spawn(
        rng: &mut impl Rng,
        text: &str,
        config: &GameConfig,
        base_speed: f32,
        words_typed: u32,
    ) -> Self
    {
        let max_x = (config.screen_width as i32 - config.spawn_x_reserve).max(config.spawn_x_min);
        let x = rng.gen_range(config.spawn_x_min..=max_x);
        let y = rng.gen_range(config.spawn_y_min..=config.spawn_y_max.max(config.spawn_y_min));
        Self {
            text: text.to_string(),
            x: x as f32,
            y: y as f32,
            speed: fall_speed(config, base_speed, words_typed, text.chars().count()),
        }
    }

    /// One tick of movement. Speed is in pixels per tick, so the fall rate is
    /// tied to the tick rate.
    pub fn advance(&mut self)
    {
        self.y += self.speed;
    }

    pub fn is_expired(&self, config: &GameConfig) -> bool
    {
        self.y > config.screen_height - config.expiry_margin
    }

    pub fn matches(&self, input: &str) -> bool
    {
        self.text.to_lowercase() == input.to_lowercase()
    }
}

pub fn effective_base_speed(config: &GameConfig, base_speed: f32, words_typed: u32) -> f32
{
    base_speed + words_typed as f32 * config.speed_increase_per_word
}

pub fn fall_speed(config: &GameConfig, base_speed: f32, words_typed: u32, word_len: usize) -> f32
{
    let base = effective_base_speed(config, base_speed, words_typed);
    if word_len <= config.min_word_length {
        base
    } else {
        base * config.deceleration_rate * (config.min_word_length as f32 / word_len as f32)
    }
}
