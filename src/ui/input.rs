use crossterm::event::{KeyCode, KeyModifiers};

// Only used when the terminal reports release events. Terminal key repeat
// keeps refreshing a real hold, so this only ends a hold whose release was lost.
const BACKSPACE_RELEASE_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command
{
    Quit,
    Submit,
    Backspace,
    Clear,
    Reset,
    CycleDifficulty,
    CycleLevel,
    ToggleDecorations,
    Type(char),
}

pub fn command_for(code: KeyCode, modifiers: KeyModifiers) -> Option<Command>
{
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Command::Quit),
            KeyCode::Char('k') => Some(Command::Clear),
            KeyCode::Char('r') => Some(Command::Reset),
            KeyCode::Char('d') => Some(Command::CycleDifficulty),
            KeyCode::Char('l') => Some(Command::CycleLevel),
            KeyCode::Char('f') => Some(Command::ToggleDecorations),
            _ => None,
        };
    }

    match code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Submit),
        KeyCode::Backspace => Some(Command::Backspace),
        KeyCode::Char(ch) if !ch.is_control() => Some(Command::Type(ch)),
        _ => None,
    }
}

/// Tracks when backspace was last seen pressed or repeated so a hold can
/// still end if its release event never arrives.
#[derive(Debug, Default)]
pub struct BackspaceHold
{
    last_press_ms: Option<u64>,
}

impl BackspaceHold
{
    pub fn pressed(&mut self, now_ms: u64)
    {
        self.last_press_ms = Some(now_ms);
    }

    pub fn released(&mut self)
    {
        self.last_press_ms = None;
    }

    /// Returns true once when the hold timed out.
    pub fn timed_out(&mut self, now_ms: u64) -> bool
    {
        match self.last_press_ms {
            Some(at) if now_ms.saturating_sub(at) > BACKSPACE_RELEASE_TIMEOUT_MS => {
                self.last_press_ms = None;
                true
            }
            _ => false,
        }
    }
}
