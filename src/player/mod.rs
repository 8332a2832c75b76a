//! Player — drives a scene through the compositor in a terminal.
//!
//! Each tick the player replays the current frame's entities into the
//! compositor and renders to a [`TerminalSurface`]. Mouse input is mapped to
//! grid cells and dispatched through the compositor; the status line shows the
//! last pointer event and its target.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::event::{self, MouseButton, MouseEvent, MouseEventKind};
use crossterm::{cursor, execute, queue, style, terminal};
use tracing::debug;

use crate::compositor::{Compositor, PointerAction, PointerButton, PointerEvent, PointerEventType, PointerInput};
use crate::config::{PlayerConfig, matches_binding};
use crate::engine::Scene;
use crate::menubar;
use crate::surface::TerminalSurface;
use crate::types::CellCoords;

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;

pub struct Player {
    scene: Scene,
    config: PlayerConfig,
    compositor: Compositor,
    surface: TerminalSurface,
    current_frame: usize,
    playing: bool,
    last_event: Option<PointerEvent>,
}

impl Player {
    pub fn new(scene: Scene, config: PlayerConfig) -> Result<Self> {
        let compositor = scene.compositor()?;
        let surface = TerminalSurface::new(usize::from(scene.height), (0, CANVAS_OFFSET));
        let playing = config.autoplay;
        Ok(Self {
            scene,
            config,
            compositor,
            surface,
            current_frame: 0,
            playing,
            last_event: None,
        })
    }

    /// Play the scene in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        let (need_w, need_h) = required_terminal_size(&self.scene);
        if term_w < need_w || term_h < need_h {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                need_w,
                need_h,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            event::EnableMouseCapture,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(
            stdout,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let tick = Duration::from_millis(self.config.tick_ms.max(1));
        self.render_menubar(stdout)?;
        self.render_frame(stdout)?;
        let mut next_tick = Instant::now() + tick;

        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                match event::read()? {
                    event::Event::Key(key) => {
                        let bindings = &self.config.key_bindings;
                        if matches_binding(&bindings.quit, &key) || key.code == event::KeyCode::Esc {
                            break;
                        } else if matches_binding(&bindings.next_frame, &key) {
                            self.step(1);
                            self.render_frame(stdout)?;
                        } else if matches_binding(&bindings.prev_frame, &key) {
                            self.step(-1);
                            self.render_frame(stdout)?;
                        } else if matches_binding(&bindings.toggle_autoplay, &key) {
                            self.playing = !self.playing;
                            self.render_status(stdout)?;
                        }
                    }
                    event::Event::Mouse(mouse) => {
                        if let Some(input) = self.pointer_input(&mouse) {
                            self.handle_pointer(input);
                            self.render_status(stdout)?;
                        }
                    }
                    event::Event::Resize(_, _) => {
                        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        self.surface.invalidate();
                        self.render_menubar(stdout)?;
                        self.render_frame(stdout)?;
                    }
                    _ => {}
                }
            }

            if Instant::now() >= next_tick {
                next_tick += tick;
                if self.playing {
                    self.step(1);
                    self.render_frame(stdout)?;
                }
            }
        }

        Ok(())
    }

    /// Move `delta` frames, wrapping around the scene.
    fn step(&mut self, delta: isize) {
        let count = self.scene.frame_count.max(1);
        self.current_frame = (self.current_frame as isize + delta).rem_euclid(count as isize) as usize;
    }

    // -----------------------------------------------------------------------
    // Pointer input
    // -----------------------------------------------------------------------

    /// Map a terminal mouse event onto the grid.
    fn pointer_input(&self, mouse: &MouseEvent) -> Option<PointerInput> {
        let action = match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => PointerAction::Move,
            MouseEventKind::Down(b) => PointerAction::Down(to_pointer_button(b)),
            MouseEventKind::Up(b) => PointerAction::Up(to_pointer_button(b)),
            _ => return None,
        };
        let cell = mouse
            .row
            .checked_sub(CANVAS_OFFSET)
            .filter(|&y| y < self.scene.height && mouse.column < self.scene.width)
            .map(|y| CellCoords::new(mouse.column, y));
        Some(PointerInput::new(action, cell))
    }

    fn handle_pointer(&mut self, input: PointerInput) {
        for event in self.compositor.dispatch_pointer(input) {
            debug!(kind = %event.kind, target = ?event.target, "pointer");
            // Moves without a target are too noisy to be worth showing.
            if event.kind != PointerEventType::MouseMove || event.target.is_some() {
                self.last_event = Some(event);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_frame(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.scene.draw_frame(self.current_frame, &mut self.compositor);
        self.compositor.render(&mut self.surface);
        self.surface.flush(stdout)?;
        self.render_status(stdout)
    }

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        menubar::render(stdout, &self.config.key_bindings)?;
        Ok(())
    }

    fn render_status(&self, stdout: &mut io::Stdout) -> Result<()> {
        let status_y = self.scene.height.saturating_add(CANVAS_OFFSET);
        let (_, term_h) = terminal::size()?;
        if status_y >= term_h {
            return Ok(()); // No room for status bar.
        }

        let pointer = match &self.last_event {
            Some(e) => format!("{} {}", e.kind, e.target.as_deref().unwrap_or("-")),
            None => "-".to_string(),
        };
        let status = format!(
            " Frame {}/{} {} | pointer: {} ",
            self.current_frame + 1,
            self.scene.frame_count.max(1),
            if self.playing { "▶" } else { "⏸" },
            pointer,
        );

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Terminal size needed for the canvas plus the menu bar and status line.
fn required_terminal_size(scene: &Scene) -> (u16, u16) {
    (scene.width, scene.height.saturating_add(CANVAS_OFFSET + 1))
}

fn to_pointer_button(b: MouseButton) -> PointerButton {
    match b {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Middle => PointerButton::Middle,
    }
}
