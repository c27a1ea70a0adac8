use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};

use flatlist::render::{RenderResult, render_document};
use flatlist::theme::Theme;
use flatlist::{Command, Document, Editor, EditorConfig, ExportTarget, parse_html};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let mut export = false;
    let mut path_arg = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--export" => export = true,
            _ => path_arg = Some(arg),
        }
    }
    let Some(path_arg) = path_arg else {
        eprintln!("Usage: flatlist [--export] <file.html>");
        return Ok(());
    };
    let path = PathBuf::from(path_arg);
    let (document, initial_status) = load_document(&path)?;

    if export {
        let editor = Editor::new(document, EditorConfig::default());
        println!("{}", editor.to_html(ExportTarget::Document));
        return Ok(());
    }

    let mut app = App::new(document, path, initial_status);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn load_document(path: &Path) -> Result<(Document, Option<String>)> {
    if !path.exists() {
        return Ok((Document::new(), Some("New document".to_string())));
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let slice = parse_html(&content);
    Ok((Document::new().with_blocks(slice.blocks), None))
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    while !app.should_quit {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt)?;
        }

        if last_tick.elapsed() >= tick_rate {
            app.prune_status_message();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

struct App {
    editor: Editor,
    theme: Theme,
    file_path: PathBuf,
    /// Last copied fragment, as clipboard HTML.
    clipboard: Option<String>,
    scroll_top: usize,
    should_quit: bool,
    dirty: bool,
    status_message: Option<(String, Instant)>,
}

impl App {
    fn new(document: Document, path: PathBuf, initial_status: Option<String>) -> Self {
        Self {
            editor: Editor::new(document, EditorConfig::default()),
            theme: Theme::default(),
            file_path: path,
            clipboard: None,
            scroll_top: 0,
            should_quit: false,
            dirty: false,
            status_message: initial_status.map(|msg| (msg, Instant::now())),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let status_height = if area.height > 1 { 2 } else { 1 };
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(status_height)])
            .split(area);
        let text_area = vertical[0];
        let status_area = vertical[1];

        let render = render_document(
            self.editor.document(),
            self.editor.selection().head(),
            usize::from(text_area.width.max(1)),
            &self.theme,
        );
        let viewport_height = usize::from(text_area.height);
        self.adjust_scroll(&render, viewport_height);

        let scroll = u16::try_from(self.scroll_top).unwrap_or(u16::MAX);
        let paragraph = Paragraph::new(Text::from(render.lines.clone()))
            .block(Block::default().borders(Borders::NONE))
            .scroll((scroll, 0));
        frame.render_widget(paragraph, text_area);

        if let Some(cursor) = render.cursor {
            if cursor.line >= self.scroll_top && cursor.line < self.scroll_top + viewport_height {
                let row = u16::try_from(cursor.line - self.scroll_top).unwrap_or(0);
                let cursor_x = text_area.x + cursor.column.min(text_area.width - 1);
                frame.set_cursor_position(Position::new(cursor_x, text_area.y + row));
            }
        }

        let status_text = self.status_line();
        let status_widget = Paragraph::new(Line::from(vec![Span::raw(status_text)]))
            .style(self.theme.status_bar_style())
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(status_widget, status_area);
    }

    fn status_line(&mut self) -> String {
        self.prune_status_message();
        let head = self.editor.selection().head();
        let position = format!("[{} {}]", head.path, head.offset + 1);
        if let Some((message, _)) = &self.status_message {
            return format!("{position} | {message}");
        }
        let item = self
            .editor
            .current_list_item()
            .map(|item| format!(" | {} item, indent {}", item.kind(), item.indent))
            .unwrap_or_default();
        let marker = if self.dirty { "*" } else { "" };
        format!(
            "{position} | {}{marker}{item} | Ctrl-S save | Ctrl-Q quit",
            self.file_path.display()
        )
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message {
            if instant.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render.total_lines.saturating_sub(viewport);
        if let Some(cursor) = &render.cursor {
            if cursor.line < self.scroll_top {
                self.scroll_top = cursor.line;
            } else if cursor.line >= self.scroll_top + viewport {
                self.scroll_top = (cursor.line + 1).saturating_sub(viewport);
            }
        }
        self.scroll_top = self.scroll_top.min(max_scroll);
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let Event::Key(key @ KeyEvent {
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return Ok(());
        };
        let Some(command) = self.editor.config().keymap.resolve(&key) else {
            return Ok(());
        };
        match command {
            Command::Quit => self.should_quit = true,
            Command::Save => self.save()?,
            Command::Copy => {
                if let Some(html) = self.editor.copy_html() {
                    self.clipboard = Some(html);
                    self.set_status("Copied");
                }
            }
            Command::Cut => {
                if let Some(html) = self.editor.cut_html() {
                    self.clipboard = Some(html);
                    self.dirty = true;
                }
            }
            Command::Paste => {
                let pasted = self
                    .clipboard
                    .clone()
                    .is_some_and(|html| self.editor.paste_html(&html));
                self.dirty |= pasted;
            }
            other => {
                if self.editor.execute(other) && is_edit(other) {
                    self.dirty = true;
                }
            }
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let contents = self.editor.to_html(ExportTarget::Document);
        fs::write(&self.file_path, contents)
            .with_context(|| format!("failed to write {}", self.file_path.display()))?;
        self.dirty = false;
        self.set_status("Saved");
        Ok(())
    }

    fn set_status(&mut self, message: &str) {
        self.status_message = Some((message.to_string(), Instant::now()));
    }
}

fn is_edit(command: Command) -> bool {
    !matches!(command, Command::Move { .. } | Command::SelectAll)
}
