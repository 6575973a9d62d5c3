mod decor;
mod input;

use crate::error::Result;
use crate::game::{FallingWord, GameSession, Phase, SessionSnapshot};
use crate::notify::Notifier;
use crate::scores::ScoreRecord;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use decor::{Decorations, FloatingText};
use input::{BackspaceHold, Command};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::info;

const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
const YELLOW: Rgb = Rgb { r: 255, g: 255, b: 0 };
const ORANGE: Rgb = Rgb { r: 255, g: 165, b: 0 };
const PURPLE: Rgb = Rgb { r: 180, g: 0, b: 255 };
const BLUE: Rgb = Rgb { r: 0, g: 100, b: 255 };
const GOLD: Rgb = Rgb { r: 255, g: 215, b: 0 };
const PROGRESS_WIDTH: usize = 25;
const PERFECT_LABEL: &str = "+2 Perfect!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb
{
    r: u8,
    g: u8,
    b: u8,
}

#[derive(Clone, Copy)]
struct Cell
{
    ch: char,
    color: Option<Rgb>,
}

struct TerminalGuard
{
    stdout: Stdout,
    release_events: bool,
}

impl TerminalGuard
{
    fn enter() -> io::Result<Self>
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let release_events = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if release_events {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        info!("Key release events {}", if release_events { "enabled" } else { "unavailable" });
        Ok(Self {
            stdout,
            release_events,
        })
    }

    fn stdout(&mut self) -> &mut Stdout
    {
        &mut self.stdout
    }
}

impl Drop for TerminalGuard
{
    fn drop(&mut self)
    {
        if self.release_events {
            let _ = execute!(self.stdout, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

struct Frontend
{
    decorations: Decorations,
    floating: Vec<FloatingText>,
    backspace: BackspaceHold,
    release_events: bool,
    last_perfect: u32,
}

/// Runs the fixed-rate loop until the player quits. `start` is the origin of
/// the millisecond clock the session was created with.
pub fn run<N: Notifier>(session: &mut GameSession<N>, start: Instant) -> Result<()>
{
    let mut term = TerminalGuard::enter()?;
    let mut rng = rand::thread_rng();
    let tick = Duration::from_millis(session.config().tick_ms);
    let mut frontend = Frontend {
        decorations: Decorations::new(session.config().screen_width, session.config().screen_height),
        floating: Vec::new(),
        backspace: BackspaceHold::default(),
        release_events: term.release_events,
        last_perfect: 0,
    };
    let mut last_tick = Instant::now();

    loop {
        if handle_input(session, &mut frontend, start)? {
            break;
        }

        if last_tick.elapsed() >= tick {
            let now_ms = clock_ms(start);
            if frontend.backspace.timed_out(now_ms) {
                session.release_backspace();
            }
            session.tick(now_ms);
            frontend.decorations.update(&mut rng);
            track_perfect_words(session, &mut frontend);

            let (field_width, field_height) = layout_metrics();
            draw_ui(term.stdout(), session, &frontend, field_width, field_height)?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    info!("Player quit");
    Ok(())
}

fn clock_ms(start: Instant) -> u64
{
    start.elapsed().as_millis() as u64
}

fn handle_input<N: Notifier>(
    session: &mut GameSession<N>,
    frontend: &mut Frontend,
    start: Instant,
) -> Result<bool>
{
    while event::poll(Duration::from_millis(0))? {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        let now_ms = clock_ms(start);

        let command = input::command_for(code, modifiers);
        if kind == KeyEventKind::Release && command != Some(Command::Backspace) {
            continue;
        }

        match command {
            Some(Command::Quit) => return Ok(true),
            Some(Command::Submit) => {
                session.submit_word(now_ms);
            }
            Some(Command::Backspace) => {
                route_backspace(session, &mut frontend.backspace, kind, frontend.release_events, now_ms);
            }
            Some(Command::Clear) => session.clear_input(),
            Some(Command::Reset) => {
                session.reset(now_ms);
                frontend.reset();
            }
            Some(Command::CycleDifficulty) => {
                let difficulty = session.cycle_difficulty(now_ms);
                info!("Difficulty set to {}", difficulty.name());
                frontend.reset();
            }
            Some(Command::CycleLevel) => {
                session.cycle_level(now_ms);
                frontend.reset();
            }
            Some(Command::ToggleDecorations) => {
                let enabled = frontend.decorations.toggle();
                info!("Decorations {}", if enabled { "on" } else { "off" });
            }
            Some(Command::Type(ch)) => session.append_char(ch),
            None => {}
        }
    }

    Ok(false)
}

/// Without release events every press is one delete and the terminal's own
/// key repeat drives a held key. With them the session runs the
/// delay-then-repeat itself until the release arrives.
fn route_backspace<N: Notifier>(
    session: &mut GameSession<N>,
    hold: &mut BackspaceHold,
    kind: KeyEventKind,
    release_events: bool,
    now_ms: u64,
)
{
    if !release_events {
        if kind != KeyEventKind::Release {
            session.backspace();
        }
        return;
    }

    match kind {
        KeyEventKind::Press => {
            hold.pressed(now_ms);
            session.press_backspace(now_ms);
        }
        KeyEventKind::Repeat => hold.pressed(now_ms),
        KeyEventKind::Release => {
            hold.released();
            session.release_backspace();
        }
    }
}

impl Frontend
{
    fn reset(&mut self)
    {
        self.floating.clear();
        self.backspace.released();
        self.last_perfect = 0;
    }
}

fn track_perfect_words<N: Notifier>(session: &GameSession<N>, frontend: &mut Frontend)
{
    let config = session.config();
    let perfect = session.snapshot().stats.perfect_words;
    if perfect > frontend.last_perfect {
        frontend.floating.push(FloatingText::new(
            150.0,
            config.screen_height - 110.0,
            PERFECT_LABEL,
            PURPLE,
        ));
    }
    frontend.last_perfect = perfect;

    for text in &mut frontend.floating {
        text.update();
    }
    frontend.floating.retain(FloatingText::is_visible);
}

fn draw_ui<N: Notifier>(
    stdout: &mut Stdout,
    session: &GameSession<N>,
    frontend: &Frontend,
    field_width: usize,
    field_height: usize,
) -> Result<()>
{
    let snapshot = session.snapshot();
    let config = session.config();
    let mut lines = Vec::new();

    lines.push(format!(
        "Falling Words  Level: {}  Difficulty: {}  FX: {}",
        snapshot.level,
        snapshot.difficulty.name(),
        if frontend.decorations.is_enabled() { "on" } else { "off" }
    ));
    let mut stats_line = vec![
        colored(&format!("Speed: {:.1}", snapshot.current_speed), ORANGE),
        colored(&format!("Perfect: {}", snapshot.stats.perfect_words), PURPLE),
        colored(&format!("On screen: {}", snapshot.words.len()), BLUE),
        colored(&format!("Missed: {}", snapshot.stats.total_missed), RED),
    ];
    if let Some(accuracy) = snapshot.accuracy() {
        stats_line.push(colored(&format!("Accuracy: {accuracy:.1}%"), YELLOW));
    }
    lines.push(stats_line.join("  "));
    lines.push(progress_line(&snapshot));

    let field_width = field_width.max(1);
    let field_height = field_height.max(1);
    let mut field = vec![vec![Cell { ch: ' ', color: None }; field_width]; field_height];
    let ground = (config.screen_height - config.expiry_margin).max(1.0);
    let project = |x: f32, y: f32| -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 || y > ground {
            return None;
        }
        let col = (x / config.screen_width * field_width as f32) as usize;
        let row = (y / ground * (field_height - 1) as f32) as usize;
        (col < field_width && row < field_height).then_some((row, col))
    };

    if snapshot.phase == Phase::Playing {
        for sprite in frontend.decorations.visible() {
            if let Some((row, col)) = project(sprite.x, sprite.y) {
                field[row][col] = Cell {
                    ch: sprite.glyph,
                    color: Some(dim(sprite.color)),
                };
            }
        }
        for word in snapshot.words {
            if let Some((row, col)) = project(word.x, word.y) {
                put_word(&mut field[row], col, word, snapshot.input);
            }
        }
        for text in &frontend.floating {
            if let Some((row, col)) = project(text.x, text.y) {
                put_text(&mut field[row], col, text.text, Some(text.faded_color()));
            }
        }
    } else {
        let best = session
            .ledger()
            .best(snapshot.level, snapshot.difficulty.name());
        let banner = banner_lines(&snapshot, best);
        let top = field_height.saturating_sub(banner.len()) / 2;
        for (offset, (text, color)) in banner.iter().enumerate() {
            if let Some(row) = field.get_mut(top + offset) {
                let col = field_width.saturating_sub(text.chars().count()) / 2;
                put_text(row, col, text, Some(*color));
            }
        }
    }

    for row in field {
        lines.push(render_row(&row));
    }
    lines.push("=".repeat(field_width));

    if snapshot.phase == Phase::Playing {
        lines.push(format!("Type: {}", colored(snapshot.input, GREEN)));
    } else {
        lines.push("Press Ctrl+R to play again".to_string());
    }
    lines.push(
        "Space/Enter: submit  Ctrl+K: clear  Ctrl+R: reset  Ctrl+D: difficulty  Ctrl+L: level  Ctrl+F: fx  Esc: quit"
            .to_string(),
    );

    let output = format!("{}\r\n", lines.join("\r\n"));

    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

fn progress_line(snapshot: &SessionSnapshot<'_>) -> String
{
    let goal = snapshot.total_words_to_win.max(1);
    let filled = (snapshot.stats.score.min(goal) as usize * PROGRESS_WIDTH) / goal as usize;
    format!(
        "[{}{}] {}/{} to win   Score: {}",
        colored(&"#".repeat(filled), GREEN),
        "-".repeat(PROGRESS_WIDTH - filled),
        snapshot.stats.score,
        goal,
        colored(&snapshot.stats.score.to_string(), GREEN)
    )
}

fn banner_lines(snapshot: &SessionSnapshot<'_>, best: Option<ScoreRecord>) -> Vec<(String, Rgb)>
{
    let accuracy = snapshot.accuracy().unwrap_or(100.0);
    let (title, title_color) = match snapshot.phase {
        Phase::Victory => ("*** VICTORY! ***", GOLD),
        _ if accuracy < 50.0 => ("GAME OVER", RED),
        _ => ("GAME OVER", BLUE),
    };

    let mut lines = vec![
        (title.to_string(), title_color),
        (String::new(), GREEN),
        (format!("Score: {} points", snapshot.stats.score), GREEN),
        (format!("Missed: {} words", snapshot.stats.total_missed), RED),
        (format!("Accuracy: {accuracy:.1}%"), YELLOW),
    ];
    if snapshot.is_new_high_score {
        lines.push(("NEW HIGH SCORE!".to_string(), PURPLE));
    }
    if let Some(best) = best {
        lines.push((
            format!(
                "Best on {} / {}: {:.1}% with {} perfect",
                snapshot.level,
                snapshot.difficulty.name(),
                best.accuracy,
                best.perfect_words
            ),
            ORANGE,
        ));
    }
    lines
}

fn put_word(row: &mut [Cell], col: usize, word: &FallingWord, input: &str)
{
    let typed = input.chars().count();
    let prefix_match = typed > 0 && word.text.to_lowercase().starts_with(&input.to_lowercase());
    for (offset, ch) in word.text.chars().enumerate() {
        let Some(cell) = row.get_mut(col + offset) else {
            break;
        };
        let color = if prefix_match && offset < typed {
            Some(GREEN)
        } else {
            None
        };
        *cell = Cell { ch, color };
    }
}

fn put_text(row: &mut [Cell], col: usize, text: &str, color: Option<Rgb>)
{
    for (offset, ch) in text.chars().enumerate() {
        if let Some(cell) = row.get_mut(col + offset) {
            *cell = Cell { ch, color };
        }
    }
}

fn dim(color: Rgb) -> Rgb
{
    Rgb {
        r: color.r / 2,
        g: color.g / 2,
        b: color.b / 2,
    }
}

fn layout_metrics() -> (usize, usize)
{
    let (cols, rows) = terminal::size().unwrap_or((80, 24));
    let width = cols as usize;
    let height = rows as usize;
    let header_lines = 3;
    let footer_lines = 3;
    let extra = header_lines + 1 + footer_lines;
    let field_height = if height > extra { height - extra } else { 6 };
    let field_height = field_height.clamp(8, 30);
    let field_width = width.saturating_sub(2).max(10);
    (field_width, field_height)
}

fn colored(text: &str, color: Rgb) -> String
{
    format!("{}{}\x1b[0m", ansi_color(color), text)
}

fn render_row(row: &[Cell]) -> String
{
    let mut line = String::with_capacity(row.len() + 16);
    let mut active: Option<Rgb> = None;
    for cell in row {
        if cell.color != active {
            if let Some(color) = cell.color {
                line.push_str(&ansi_color(color));
            } else {
                line.push_str("\x1b[0m");
            }
            active = cell.color;
        }
        line.push(cell.ch);
    }
    if active.is_some() {
        line.push_str("\x1b[0m");
    }
    line
}

fn ansi_color(color: Rgb) -> String
{
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::config::{Difficulty, GameConfig};
    use crate::game::session::Stats;
    use crate::notify::Signal;
    use crate::scores::ScoreLedger;
    use crate::words::WordSource;

    struct Quiet;

    impl Notifier for Quiet
    {
        fn notify(&mut self, _signal: Signal) {}
    }

    fn typing_session(text: &str) -> GameSession<Quiet>
    {
        let words = WordSource::new([("test", vec!["zebra"])]);
        let mut session = GameSession::new(GameConfig::default(), words, ScoreLedger::in_memory(), Quiet, 7, 0);
        for ch in text.chars() {
            session.append_char(ch);
        }
        session
    }

    fn run_ticks(session: &mut GameSession<Quiet>, hold: &mut BackspaceHold, from: u64, to: u64)
    {
        let mut now = from;
        while now <= to {
            if hold.timed_out(now) {
                session.release_backspace();
            }
            session.tick(now);
            now += 16;
        }
    }

    fn snapshot(phase: Phase, stats: Stats) -> SessionSnapshot<'static>
    {
        SessionSnapshot {
            words: &[],
            input: "",
            stats,
            phase,
            is_new_high_score: false,
            level: "animals",
            difficulty: Difficulty::Expert,
            current_speed: 2.0,
            total_words_to_win: 30,
        }
    }

    #[test]
    fn test_render_row_resets_color_runs()
    {
        let row = [
            Cell { ch: 'a', color: Some(GREEN) },
            Cell { ch: 'b', color: Some(GREEN) },
            Cell { ch: 'c', color: None },
        ];
        assert_eq!(render_row(&row), "\x1b[38;2;0;255;0mab\x1b[0mc");
    }

    #[test]
    fn test_put_word_highlights_typed_prefix()
    {
        let mut row = vec![Cell { ch: ' ', color: None }; 6];
        let word = FallingWord {
            text: "Horse".to_string(),
            x: 0.0,
            y: 0.0,
            speed: 1.0,
        };
        put_word(&mut row, 2, &word, "ho");

        let text: String = row.iter().map(|cell| cell.ch).collect();
        assert_eq!(text, "  Hors");
        assert_eq!(row[2].color, Some(GREEN));
        assert_eq!(row[3].color, Some(GREEN));
        assert_eq!(row[4].color, None);
    }

    #[test]
    fn test_progress_line_caps_at_goal()
    {
        let stats = Stats {
            score: 45,
            ..Stats::default()
        };
        let line = progress_line(&snapshot(Phase::Victory, stats));
        assert!(line.contains(&"#".repeat(PROGRESS_WIDTH)));
        assert!(line.contains("45/30 to win"));
    }

    #[test]
    fn test_banner_for_poor_game_over()
    {
        let stats = Stats {
            words_typed: 1,
            total_missed: 3,
            ..Stats::default()
        };
        let best = ScoreRecord {
            accuracy: 80.0,
            perfect_words: 4,
        };
        let lines = banner_lines(&snapshot(Phase::GameOver, stats), Some(best));

        assert_eq!(lines[0], ("GAME OVER".to_string(), RED));
        assert!(lines.iter().any(|(text, _)| text == "Accuracy: 25.0%"));
        assert!(lines.iter().any(|(text, _)| text.contains("80.0% with 4 perfect")));
        assert!(!lines.iter().any(|(text, _)| text.contains("NEW HIGH SCORE")));
    }

    #[test]
    fn test_quick_taps_without_release_events_delete_once_each()
    {
        let mut session = typing_session("abcdef");
        let mut hold = BackspaceHold::default();

        route_backspace(&mut session, &mut hold, KeyEventKind::Press, false, 1000);
        run_ticks(&mut session, &mut hold, 1016, 1064);
        route_backspace(&mut session, &mut hold, KeyEventKind::Press, false, 1080);
        run_ticks(&mut session, &mut hold, 1096, 1600);

        assert_eq!(session.snapshot().input, "abcd");
    }

    #[test]
    fn test_terminal_repeat_without_release_events_deletes_per_press()
    {
        let mut session = typing_session("abcdef");
        let mut hold = BackspaceHold::default();

        for now in [0, 500, 530, 560] {
            route_backspace(&mut session, &mut hold, KeyEventKind::Press, false, now);
        }
        route_backspace(&mut session, &mut hold, KeyEventKind::Release, false, 600);
        run_ticks(&mut session, &mut hold, 600, 1200);

        assert_eq!(session.snapshot().input, "ab");
    }

    #[test]
    fn test_held_backspace_with_release_events_repeats_until_release()
    {
        let mut session = typing_session("abcdefghij");
        let mut hold = BackspaceHold::default();

        route_backspace(&mut session, &mut hold, KeyEventKind::Press, true, 1000);
        assert_eq!(session.snapshot().input, "abcdefghi");
        run_ticks(&mut session, &mut hold, 1016, 1096);
        route_backspace(&mut session, &mut hold, KeyEventKind::Repeat, true, 1100);
        // repeats at 1152, 1216, 1264, 1312 and 1360
        run_ticks(&mut session, &mut hold, 1104, 1400);
        assert_eq!(session.snapshot().input, "abcd");

        route_backspace(&mut session, &mut hold, KeyEventKind::Release, true, 1400);
        run_ticks(&mut session, &mut hold, 1416, 2000);
        assert_eq!(session.snapshot().input, "abcd");
    }

    #[test]
    fn test_lost_release_ends_hold_after_timeout()
    {
        let mut session = typing_session("abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz");
        let mut hold = BackspaceHold::default();

        route_backspace(&mut session, &mut hold, KeyEventKind::Press, true, 0);
        run_ticks(&mut session, &mut hold, 16, 1200);
        let after_timeout = session.snapshot().input.len();
        assert!(after_timeout < 51);

        run_ticks(&mut session, &mut hold, 1216, 3000);
        assert_eq!(session.snapshot().input.len(), after_timeout);
    }
}
