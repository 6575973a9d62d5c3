use super::Rgb;
use rand::Rng;

const SPAWN_CHANCE: f64 = 0.01;
const MAX_SPRITES: usize = 5;
const GLYPHS: [char; 4] = ['*', 'o', '+', 'x'];
const FLOAT_RISE: f32 = 2.0;
const FLOAT_FADE: i32 = 5;

#[derive(Debug, Clone)]
pub struct Sprite
{
    pub x: f32,
    pub y: f32,
    pub glyph: char,
    pub color: Rgb,
    size: f32,
    speed_x: f32,
    speed_y: f32,
    moving_up: bool,
}

impl Sprite
{
    fn spawn(rng: &mut impl Rng, width: f32, height: f32) -> Self
    {
        let size = rng.gen_range(40..=90) as f32;
        let x = rng.gen_range(size..=(width - size).max(size));
        let moving_up = rng.gen_bool(0.5);
        let speed = rng.gen_range(1.0..=3.0);
        let (y, speed_y) = if moving_up {
            (height + size, -speed)
        } else {
            (-size, speed)
        };
        Self {
            x,
            y,
            glyph: GLYPHS[rng.gen_range(0..GLYPHS.len())],
            color: Rgb {
                r: rng.gen_range(50..=255),
                g: rng.gen_range(50..=255),
                b: rng.gen_range(50..=255),
            },
            size,
            speed_x: rng.gen_range(-2.0..=2.0),
            speed_y,
            moving_up,
        }
    }

    fn update(&mut self, width: f32)
    {
        self.y += self.speed_y;
        self.x += self.speed_x;

        let half = self.size / 2.0;
        if self.x <= half {
            self.x = half;
            self.speed_x = -self.speed_x;
        } else if self.x >= width - half {
            self.x = width - half;
            self.speed_x = -self.speed_x;
        }
    }

    fn is_off_screen(&self, height: f32) -> bool
    {
        if self.moving_up {
            self.y < -self.size * 2.0
        } else {
            self.y > height + self.size * 2.0
        }
    }
}

/// Background sprites drifting across the field, purely cosmetic.
pub struct Decorations
{
    enabled: bool,
    width: f32,
    height: f32,
    sprites: Vec<Sprite>,
}

impl Decorations
{
    pub fn new(width: f32, height: f32) -> Self
    {
        Self {
            enabled: true,
            width,
            height,
            sprites: Vec::new(),
        }
    }

    pub fn toggle(&mut self) -> bool
    {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn is_enabled(&self) -> bool
    {
        self.enabled
    }

    pub fn update(&mut self, rng: &mut impl Rng)
    {
        if !self.enabled {
            return;
        }
        if self.sprites.len() < MAX_SPRITES && rng.gen_bool(SPAWN_CHANCE) {
            self.sprites.push(Sprite::spawn(rng, self.width, self.height));
        }
        for sprite in &mut self.sprites {
            sprite.update(self.width);
        }
        let height = self.height;
        self.sprites.retain(|sprite| !sprite.is_off_screen(height));
    }

    pub fn visible(&self) -> &[Sprite]
    {
        if self.enabled { &self.sprites[..] } else { &[] }
    }
}

/// Short-lived label that drifts up and fades out.
#[derive(Debug, Clone)]
pub struct FloatingText
{
    pub x: f32,
    pub y: f32,
    pub text: &'static str,
    pub color: Rgb,
    alpha: i32,
}

impl FloatingText
{
    pub fn new(x: f32, y: f32, text: &'static str, color: Rgb) -> Self
    {
        Self {
            x,
            y,
            text,
            color,
            alpha: 255,
        }
    }

    pub fn update(&mut self)
    {
        self.y -= FLOAT_RISE;
        self.alpha -= FLOAT_FADE;
    }

    pub fn is_visible(&self) -> bool
    {
        self.alpha > 0
    }

    pub fn faded_color(&self) -> Rgb
    {
        let factor = self.alpha.clamp(0, 255) as f32 / 255.0;
        Rgb {
            r: (self.color.r as f32 * factor) as u8,
            g: (self.color.g as f32 * factor) as u8,
            b: (self.color.b as f32 * factor) as u8,
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sprites_bounce_off_side_walls()
    {
        let mut rng = StdRng::seed_from_u64(8);
        let mut sprite = Sprite::spawn(&mut rng, 900.0, 650.0);
        sprite.x = 30.0;
        sprite.size = 60.0;
        sprite.speed_x = -2.0;

        sprite.update(900.0);

        assert_eq!(sprite.x, 30.0);
        assert_eq!(sprite.speed_x, 2.0);
    }

    #[test]
    fn test_sprite_count_is_capped_and_off_screen_removed()
    {
        let mut rng = StdRng::seed_from_u64(21);
        let mut decorations = Decorations::new(900.0, 650.0);
        for _ in 0..20_000 {
            decorations.update(&mut rng);
            assert!(decorations.visible().len() <= MAX_SPRITES);
            for sprite in decorations.visible() {
                assert!(!sprite.is_off_screen(650.0));
            }
        }
    }

    #[test]
    fn test_disabled_layer_is_hidden_and_frozen()
    {
        let mut rng = StdRng::seed_from_u64(2);
        let mut decorations = Decorations::new(900.0, 650.0);
        decorations.sprites.push(Sprite::spawn(&mut rng, 900.0, 650.0));

        assert!(!decorations.toggle());
        let y = decorations.sprites[0].y;
        decorations.update(&mut rng);

        assert!(decorations.visible().is_empty());
        assert_eq!(decorations.sprites[0].y, y);
        assert!(decorations.toggle());
        assert_eq!(decorations.visible().len(), 1);
    }

    #[test]
    fn test_floating_text_fades_out()
    {
        let purple = Rgb { r: 180, g: 0, b: 255 };
        let mut text = FloatingText::new(150.0, 540.0, "+2 Perfect!", purple);
        let mut frames = 0;
        while text.is_visible() {
            text.update();
            frames += 1;
        }
        assert_eq!(frames, 51);
        assert_eq!(text.y, 540.0 - 102.0);
        assert_eq!(text.faded_color(), Rgb { r: 0, g: 0, b: 0 });
    }
}
