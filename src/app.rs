#![forbid(unsafe_code)]

use ftui::{Cmd, Event, Frame, KeyCode, KeyEvent, KeyEventKind, Model, Modifiers};
use tracing::{debug, info, warn};

use crate::fs_ops;
use crate::model::{FsError, Mode, OpKind, Operation, VisualRange};
use crate::pane::Pane;
use crate::queue::OpQueue;
use crate::search::SearchPane;
use crate::text::Text;
use crate::ui::{self, Theme};

pub const MAX_PANES: usize = 2;
const QUEUE_START_CAPACITY: usize = 5;

#[derive(Debug, Clone)]
pub enum Msg {
    Event(Event),
    Quit,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        Msg::Event(event)
    }
}

/// Whole application state: the open panes, the modal state machine and the
/// pending-operation queue. One key event is handled to completion before
/// the next is fetched, so nothing here needs interior locking.
pub struct App {
    panes: Vec<Pane>,
    active: usize,
    mode: Mode,
    search: SearchPane,
    queue: OpQueue,
    pending_name: Text,
    visual: Option<VisualRange>,
    status: String,
    term_width: u16,
    term_height: u16,
    theme: Theme,
}

impl App {
    pub fn new(term_width: u16, term_height: u16, start_dir: Text) -> Result<Self, FsError> {
        let mut pane = Pane::new(
            2,
            0,
            term_width.saturating_sub(10),
            term_height.saturating_sub(1),
            start_dir,
        );
        pane.load()?;
        Ok(Self {
            panes: vec![pane],
            active: 0,
            mode: Mode::Normal,
            search: SearchPane::new(),
            queue: OpQueue::new(QUEUE_START_CAPACITY),
            pending_name: Text::new(20),
            visual: None,
            status: String::new(),
            term_width,
            term_height,
            theme: Theme::classic(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn queue(&self) -> &OpQueue {
        &self.queue
    }

    pub fn search(&self) -> &SearchPane {
        &self.search
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn visual_range(&self) -> Option<VisualRange> {
        self.visual
    }

    fn active_pane(&self) -> &Pane {
        &self.panes[self.active]
    }

    fn active_pane_mut(&mut self) -> &mut Pane {
        &mut self.panes[self.active]
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "mode transition");
        }
        self.mode = mode;
    }

    fn report(&mut self, err: &FsError) {
        warn!(error = %err, "filesystem error");
        self.status = err.to_string();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if key.kind != KeyEventKind::Press {
            return Cmd::none();
        }
        let ctrl = key.modifiers.contains(Modifiers::CTRL);
        self.dispatch(key.code, ctrl)
    }

    // Single entry point of the state machine; exercised directly by tests.
    pub fn dispatch(&mut self, code: KeyCode, ctrl: bool) -> Cmd<Msg> {
        self.status.clear();
        match self.mode {
            Mode::Normal => self.normal_key(code, ctrl),
            Mode::Search => self.search_key(code),
            Mode::Insert => self.insert_key(code),
            Mode::Visual => self.visual_key(code),
        }
    }

    fn normal_key(&mut self, code: KeyCode, ctrl: bool) -> Cmd<Msg> {
        match code {
            KeyCode::Char('d') if ctrl => {
                let first_file = self.active_pane().files_start;
                self.active_pane_mut().jump_to_line(first_file);
            }
            KeyCode::Char('u') if ctrl => self.active_pane_mut().jump_to_line(0),
            KeyCode::Char('j') => self.active_pane_mut().select_next(),
            KeyCode::Char('k') => self.active_pane_mut().select_prev(),
            KeyCode::Char('h') => self.go_parent(),
            KeyCode::Char('l') | KeyCode::Enter => self.descend(),
            KeyCode::Char('D') => self.delete_current(),
            KeyCode::Char('d') => self.enqueue_current(OpKind::Move),
            KeyCode::Char('y') => self.enqueue_current(OpKind::Copy),
            KeyCode::Char('p') => self.paste(),
            KeyCode::Char('s') => {
                self.search.run(&self.panes[self.active]);
                self.set_mode(Mode::Search);
            }
            KeyCode::Char('i') => {
                self.pending_name.clear();
                self.set_mode(Mode::Insert);
            }
            KeyCode::Char('v') => {
                if self.active_pane().num_lines > 0 {
                    self.visual = Some(VisualRange::new(self.active_pane().current_line));
                    self.set_mode(Mode::Visual);
                }
            }
            KeyCode::Char('V') => self.vertical_split(),
            KeyCode::Char('w') => self.active = (self.active + 1) % self.panes.len(),
            KeyCode::Char('q') => return Cmd::quit(),
            _ => {}
        }
        Cmd::none()
    }

    fn search_key(&mut self, code: KeyCode) -> Cmd<Msg> {
        match code {
            KeyCode::Char(c) if is_printable(c) => {
                self.search.query.push(c as u8);
                self.search.run(&self.panes[self.active]);
            }
            KeyCode::Backspace => {
                if self.search.query.pop().is_some() {
                    self.search.run(&self.panes[self.active]);
                }
            }
            KeyCode::Tab => self.search.cycle(),
            KeyCode::Enter => {
                let target = self.search.selected().map(|hit| hit.line);
                self.search.query.clear();
                if let Some(line) = target {
                    self.active_pane_mut().jump_to_line(line);
                }
                self.set_mode(Mode::Normal);
            }
            KeyCode::Escape => {
                self.search.query.clear();
                self.set_mode(Mode::Normal);
            }
            _ => {}
        }
        Cmd::none()
    }

    fn insert_key(&mut self, code: KeyCode) -> Cmd<Msg> {
        match code {
            KeyCode::Char(c) if is_printable(c) => self.pending_name.push(c as u8),
            KeyCode::Backspace => {
                self.pending_name.pop();
            }
            KeyCode::Enter => {
                if !self.pending_name.is_empty() {
                    let path = fs_ops::join(&self.active_pane().cwd, &self.pending_name);
                    match fs_ops::create_exclusive(&path) {
                        Ok(()) => info!(path = %path.display(), "created file"),
                        Err(err) => self.report(&err),
                    }
                    self.pending_name.clear();
                    if let Err(err) = self.active_pane_mut().load() {
                        self.report(&err);
                    }
                }
                self.set_mode(Mode::Normal);
            }
            KeyCode::Escape => {
                self.pending_name.clear();
                self.set_mode(Mode::Normal);
            }
            _ => {}
        }
        Cmd::none()
    }

    fn visual_key(&mut self, code: KeyCode) -> Cmd<Msg> {
        let Some(mut range) = self.visual else {
            self.set_mode(Mode::Normal);
            return Cmd::none();
        };
        match code {
            KeyCode::Char('j') => {
                let pane = self.active_pane_mut();
                // The anchor edge stays pinned; only the other edge moves.
                if !(range.start == range.anchor && range.end >= pane.num_lines) {
                    if range.start == range.anchor {
                        range.end += 1;
                    } else {
                        range.start += 1;
                    }
                    if range.end >= pane.view_end {
                        pane.scroll(1);
                    }
                }
                self.visual = Some(range);
            }
            KeyCode::Char('k') => {
                let pane = self.active_pane_mut();
                if !(range.end == range.anchor + 1 && range.start == 0) {
                    if range.end == range.start + 1 {
                        range.start -= 1;
                    } else if range.start == range.anchor {
                        range.end -= 1;
                    } else {
                        range.start -= 1;
                    }
                    if range.start < pane.view_start {
                        pane.scroll(-1);
                    }
                }
                self.visual = Some(range);
            }
            KeyCode::Char('y') => {
                self.enqueue_range(range);
                self.visual = None;
                self.set_mode(Mode::Normal);
            }
            KeyCode::Char('D') => {
                self.delete_range(range);
                self.visual = None;
                self.set_mode(Mode::Normal);
            }
            _ => {
                self.visual = None;
                self.set_mode(Mode::Normal);
            }
        }
        Cmd::none()
    }

    fn go_parent(&mut self) {
        let saved = self.active_pane().cwd.clone();
        self.active_pane_mut().pop_dir();
        if let Err(err) = self.active_pane_mut().load() {
            self.active_pane_mut().cwd = saved;
            self.report(&err);
        }
    }

    fn descend(&mut self) {
        let Some(line) = self.active_pane().current() else {
            return;
        };
        if !line.is_dir {
            return;
        }
        let name = line.text.clone();
        self.active_pane_mut().push_dir(&name);
        if let Err(err) = self.active_pane_mut().load() {
            self.active_pane_mut().pop_dir();
            self.report(&err);
        }
    }

    fn delete_current(&mut self) {
        let Some(line) = self.active_pane().current() else {
            return;
        };
        let name = line.text.clone();
        let path = fs_ops::join(&self.active_pane().cwd, &name);
        match fs_ops::unlink(&path) {
            Ok(()) => {
                if let Err(err) = self.active_pane_mut().load() {
                    self.report(&err);
                }
            }
            Err(err) => self.report(&err),
        }
    }

    fn enqueue_current(&mut self, kind: OpKind) {
        let Some(line) = self.active_pane().current() else {
            return;
        };
        let name = line.text.clone();
        let is_dir = line.is_dir;
        let source_dir = self.active_pane().cwd.clone();
        info!(?kind, name = %name, "queued operation");
        self.queue.enqueue(Operation { kind, is_dir, name: name.clone(), source_dir, dest_dir: None });
        self.status = match kind {
            OpKind::Copy => format!("Queued copy: {name}"),
            OpKind::Move => format!("Queued move: {name}"),
        };
    }

    fn enqueue_range(&mut self, range: VisualRange) {
        let pane = self.active_pane();
        let end = range.end.min(pane.num_lines);
        let items: Vec<(Text, bool)> = pane.lines()[range.start..end]
            .iter()
            .map(|line| (line.text.clone(), line.is_dir))
            .collect();
        let source_dir = pane.cwd.clone();
        let count = items.len();
        for (name, is_dir) in items {
            self.queue.enqueue(Operation {
                kind: OpKind::Copy,
                is_dir,
                name,
                source_dir: source_dir.clone(),
                dest_dir: None,
            });
        }
        info!(count, "queued copy of visual range");
        self.status = format!("Queued copy: {count} entries");
    }

    fn delete_range(&mut self, range: VisualRange) {
        let pane = self.active_pane();
        let end = range.end.min(pane.num_lines);
        let targets: Vec<Text> =
            pane.lines()[range.start..end].iter().map(|line| line.text.clone()).collect();
        let cwd = pane.cwd.clone();
        let mut first_error = None;
        for name in targets {
            if let Err(err) = fs_ops::unlink(&fs_ops::join(&cwd, &name)) {
                warn!(error = %err, "visual delete");
                first_error.get_or_insert(err);
            }
        }
        if let Some(err) = first_error {
            self.status = err.to_string();
        }
        if let Err(err) = self.active_pane_mut().load() {
            self.report(&err);
        }
    }

    /// Dequeue one pending operation and execute it against the active
    /// pane's directory. A move additionally reloads any other pane still
    /// showing the source directory, so the entry disappears there too.
    fn paste(&mut self) {
        let Some(mut op) = self.queue.dequeue() else {
            return;
        };
        let dest_dir = self.active_pane().cwd.clone();
        let src = fs_ops::join(&op.source_dir, &op.name);
        let dst = fs_ops::join(&dest_dir, &op.name);
        op.dest_dir = Some(dest_dir);

        let result = fs_ops::copy_entry(&src, &dst, op.is_dir).and_then(|()| {
            if op.kind == OpKind::Move { fs_ops::remove_entry(&src, op.is_dir) } else { Ok(()) }
        });
        match result {
            Ok(()) => {
                info!(kind = ?op.kind, src = %src.display(), dst = %dst.display(), "executed operation");
                self.status = format!("Pasted {}", op.name);
                if op.kind == OpKind::Move {
                    for index in 0..self.panes.len() {
                        if index != self.active && self.panes[index].cwd == op.source_dir {
                            if let Err(err) = self.panes[index].load() {
                                self.report(&err);
                            }
                        }
                    }
                }
                if let Err(err) = self.active_pane_mut().load() {
                    self.report(&err);
                }
            }
            Err(err) => self.report(&err),
        }
    }

    fn vertical_split(&mut self) {
        if self.panes.len() >= MAX_PANES {
            return;
        }
        let (x, y, height, half, cwd) = {
            let pane = self.active_pane_mut();
            pane.width /= 2;
            (pane.x, pane.y, pane.height, pane.width, pane.cwd.clone())
        };
        let mut pane = Pane::new(x * 2 + half, y, half, height, cwd);
        match pane.load() {
            Ok(()) => {
                debug!(panes = self.panes.len() + 1, "vertical split");
                self.panes.push(pane);
            }
            Err(err) => {
                self.active_pane_mut().width = half * 2;
                self.report(&err);
            }
        }
    }

    // Rebuild pane geometry after a terminal resize; viewports reset to the
    // top and the selection is scrolled back into view.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.term_width = width;
        self.term_height = height;
        let mut pane_width = width.saturating_sub(10);
        let pane_height = height.saturating_sub(1);
        if self.panes.len() == MAX_PANES {
            pane_width /= 2;
        }
        for (index, pane) in self.panes.iter_mut().enumerate() {
            pane.x = if index == 0 { 2 } else { 4 + pane_width };
            pane.y = 0;
            pane.width = pane_width;
            pane.height = pane_height;
            pane.view_start = 0;
            pane.view_end = (pane_height as usize).saturating_sub(1);
            let line = pane.current_line.min(pane.num_lines.saturating_sub(1));
            pane.jump_to_line(line);
        }
        if self.mode == Mode::Search {
            self.search.run(&self.panes[self.active]);
        }
    }

    fn render(&self, frame: &mut Frame) {
        ui::render_background(frame, self.theme);
        for (index, pane) in self.panes.iter().enumerate() {
            let is_active = index == self.active;
            let overlay_rows = if is_active && self.mode == Mode::Search {
                self.search.height as usize
            } else {
                0
            };
            let visual = if is_active && self.mode == Mode::Visual {
                self.visual.as_ref()
            } else {
                None
            };
            ui::render_pane(frame, pane, is_active, visual, overlay_rows, self.theme);
        }
        if self.panes.len() == MAX_PANES {
            let boundary = self.panes[0].x + self.panes[0].width;
            ui::render_separator(frame, boundary, self.term_height, self.theme);
        }
        if self.mode == Mode::Search {
            ui::render_search(frame, &self.search, &self.panes[self.active], self.theme);
        }

        let content = if !self.status.is_empty() {
            self.status.clone()
        } else {
            match self.mode {
                Mode::Search => self.search.query.to_string(),
                Mode::Insert => self.pending_name.to_string(),
                _ => String::new(),
            }
        };
        let x = self.active_pane().x;
        ui::render_input_line(
            frame,
            x,
            self.term_height.saturating_sub(1),
            self.term_width.saturating_sub(x),
            self.mode,
            &content,
            self.theme,
        );
    }
}

fn is_printable(c: char) -> bool {
    (' '..='~').contains(&c)
}

impl Model for App {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Event(Event::Key(key)) => self.handle_key(key),
            Msg::Event(Event::Resize { width, height }) => {
                self.resize(width, height);
                Cmd::none()
            }
            Msg::Event(_) => Cmd::none(),
            Msg::Quit => Cmd::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        self.render(frame);
    }
}
