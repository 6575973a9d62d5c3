/// Auto-repeat for a held backspace: nothing for `delay_ms` after the press,
/// then one repeat every `interval_ms`.
#[derive(Debug, Clone)]
pub struct BackspaceRepeat
{
    held: bool,
    pressed_at: u64,
    repeats_fired: u64,
    delay_ms: u64,
    interval_ms: u64,
}

impl BackspaceRepeat
{
    pub fn new(delay_ms: u64, interval_ms: u64) -> Self
    {
        Self {
            held: false,
            pressed_at: 0,
            repeats_fired: 0,
            delay_ms,
            interval_ms: interval_ms.max(1),
        }
    }

    /// Returns true on a fresh press. Presses while already held only come
    /// from terminal key repeat and are absorbed.
    pub fn press(&mut self, now_ms: u64) -> bool
    {
        if self.held {
            return false;
        }
        self.held = true;
        self.pressed_at = now_ms;
        self.repeats_fired = 0;
        true
    }

    pub fn release(&mut self)
    {
        self.held = false;
        self.repeats_fired = 0;
    }

    /// Number of repeats that became due since the last call.
    pub fn due(&mut self, now_ms: u64) -> u64
    {
        if !self.held {
            return 0;
        }
        let held_for = now_ms.saturating_sub(self.pressed_at);
        if held_for <= self.delay_ms {
            return 0;
        }
        let expected = (held_for - self.delay_ms - 1) / self.interval_ms + 1;
        let due = expected.saturating_sub(self.repeats_fired);
        self.repeats_fired = expected;
        due
    }
}
