use crate::config::Config;
use crate::render::{CardAction, EMPTY_MESSAGE, ListView, neutralize_block, neutralize_line};
use crate::service::{Commands, Confirmation, EditMode, Notice, ProblemForm, ProblemService, ProblemStatistics};
use crate::storage::{FileStore, KeyValueStore};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    List,
    Form,
    Search,
    DeleteConfirm,
    Statistics,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Topic,
    Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Topic,
    Difficulty,
    Code,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Topic,
            FormField::Topic => FormField::Difficulty,
            FormField::Difficulty => FormField::Code,
            FormField::Code => FormField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            FormField::Title => FormField::Code,
            FormField::Topic => FormField::Title,
            FormField::Difficulty => FormField::Topic,
            FormField::Code => FormField::Difficulty,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Topic => "Topic",
            FormField::Difficulty => "Difficulty",
            FormField::Code => "Code",
        }
    }
}

pub struct App<S: KeyValueStore = FileStore> {
    pub commands: Commands<S, ListView>,
    pub mode: AppMode,
    pub edit_mode: EditMode,
    pub form: ProblemForm,
    pub focused: FormField,
    pub search_target: SearchTarget,
    pub input_buffer: String,
    pub pending_delete: Option<(String, String)>, // (id, title)
    pub statistics: Option<ProblemStatistics>,
    pub export_path: PathBuf,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl App<FileStore> {
    pub fn new(config: &Config) -> Result<Self> {
        let service = ProblemService::new(FileStore::new(&config.data_dir));
        App::with_service(service, config.export_path())
    }
}

impl<S: KeyValueStore> App<S> {
    pub fn with_service(service: ProblemService<S>, export_path: PathBuf) -> Result<Self> {
        let mut commands = Commands::new(service, ListView::new());
        commands.view_all()?;

        Ok(App {
            commands,
            mode: AppMode::List,
            edit_mode: EditMode::Idle,
            form: ProblemForm::default(),
            focused: FormField::Title,
            search_target: SearchTarget::Topic,
            input_buffer: String::new(),
            pending_delete: None,
            statistics: None,
            export_path,
            should_quit: false,
            status_message: None,
        })
    }

    fn view(&self) -> &ListView {
        self.commands.renderer()
    }

    fn show_notice(&mut self, notice: Notice) {
        self.status_message = Some(match notice {
            Notice::Warning(msg) => format!("⚠ {}", msg),
            Notice::Success(msg) => format!("✓ {}", msg),
        });
    }

    /// Command failures end up in the status bar instead of tearing down the UI.
    fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            log::error!("command failed: {:#}", e);
            self.status_message = Some(format!("✗ {:#}", e));
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let result = match self.mode {
            AppMode::List => self.handle_list_key(key),
            AppMode::Form => self.handle_form_key(key, modifiers),
            AppMode::Search => self.handle_search_key(key),
            AppMode::DeleteConfirm => self.handle_delete_confirm_key(key),
            AppMode::Statistics | AppMode::Help => {
                if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
                    self.mode = AppMode::List;
                }
                Ok(())
            }
        };
        self.report(result);
    }

    fn handle_list_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.commands.renderer_mut().select_next();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.commands.renderer_mut().select_previous();
            }
            KeyCode::Char('n') => {
                self.mode = AppMode::Form;
                self.focused = FormField::Title;
                self.status_message = None;
            }
            KeyCode::Char('e') => {
                if let Some((_, id)) = self.view().action_target(CardAction::Edit) {
                    let id = id.to_string();
                    self.edit_mode = self.commands.start_edit(self.edit_mode.clone(), &id, &mut self.form)?;
                    if self.edit_mode == EditMode::Editing(id) {
                        self.mode = AppMode::Form;
                        self.focused = FormField::Title;
                        self.status_message = None;
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some((_, id)) = self.view().action_target(CardAction::Delete) {
                    let id = id.to_string();
                    let title = self.view().selected().map(|c| c.title.clone()).unwrap_or_default();
                    self.pending_delete = Some((id, title));
                    self.mode = AppMode::DeleteConfirm;
                }
            }
            KeyCode::Char('/') => {
                self.start_search(SearchTarget::Topic);
            }
            KeyCode::Char('D') => {
                self.start_search(SearchTarget::Difficulty);
            }
            KeyCode::Char('a') => {
                self.commands.view_all()?;
                self.status_message = None;
            }
            KeyCode::Char('s') => {
                self.commands.sort_by_date()?;
                self.status_message = Some("✓ Sorted by date (newest first)".to_string());
            }
            KeyCode::Char('S') => {
                self.commands.sort_by_difficulty()?;
                self.status_message = Some("✓ Sorted by difficulty".to_string());
            }
            KeyCode::Char('x') => {
                let count = self.commands.export_html(&self.export_path)?;
                self.status_message = Some(format!(
                    "✓ Exported {} problems to {}",
                    count,
                    self.export_path.display()
                ));
            }
            KeyCode::Char('i') => {
                self.statistics = Some(self.commands.statistics()?);
                self.mode = AppMode::Statistics;
            }
            KeyCode::Char('?') => {
                self.mode = AppMode::Help;
            }
            _ => {}
        }
        Ok(())
    }

    fn start_search(&mut self, target: SearchTarget) {
        self.search_target = target;
        self.input_buffer.clear();
        self.mode = AppMode::Search;
        self.status_message = None;
    }

    fn focused_text(&mut self) -> &mut String {
        match self.focused {
            FormField::Title => &mut self.form.title,
            FormField::Topic => &mut self.form.topic,
            FormField::Difficulty => &mut self.form.difficulty,
            FormField::Code => &mut self.form.code,
        }
    }

    fn handle_form_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        match key {
            KeyCode::Esc => {
                // Form content and edit mode survive until the next submit.
                self.mode = AppMode::List;
            }
            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => {
                let (mode, notice) = self.commands.submit(self.edit_mode.clone(), &mut self.form)?;
                let accepted = matches!(notice, Notice::Success(_));
                self.edit_mode = mode;
                self.show_notice(notice);
                if accepted {
                    self.mode = AppMode::List;
                    self.focused = FormField::Title;
                }
            }
            KeyCode::Tab => {
                self.focused = self.focused.next();
            }
            KeyCode::BackTab => {
                self.focused = self.focused.previous();
            }
            KeyCode::Enter => {
                if self.focused == FormField::Code {
                    self.form.code.push('\n');
                } else {
                    self.focused = self.focused.next();
                }
            }
            KeyCode::Char(c) => {
                self.focused_text().push(c);
            }
            KeyCode::Backspace => {
                self.focused_text().pop();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.mode = AppMode::List;
            }
            KeyCode::Enter => {
                let keyword = std::mem::take(&mut self.input_buffer);
                let notice = match self.search_target {
                    SearchTarget::Topic => self.commands.search_by_topic(&keyword)?,
                    SearchTarget::Difficulty => self.commands.search_by_difficulty(&keyword)?,
                };
                match notice {
                    Some(notice) => self.show_notice(notice),
                    None => {
                        self.status_message = Some(format!(
                            "{} found for '{}' (a: view all)",
                            self.view().cards().len(),
                            keyword.trim()
                        ));
                    }
                }
                self.mode = AppMode::List;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_delete_confirm_key(&mut self, key: KeyCode) -> Result<()> {
        let confirmation = match key {
            KeyCode::Char('y') | KeyCode::Enter => Confirmation::Accepted,
            KeyCode::Char('n') | KeyCode::Esc => Confirmation::Declined,
            _ => return Ok(()),
        };

        self.mode = AppMode::List;
        if let Some((id, _)) = self.pending_delete.take() {
            if let Some(notice) = self.commands.delete(&id, confirmation)? {
                self.show_notice(notice);
            }
        }
        Ok(())
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        // Title bar
        let title_text = match &self.edit_mode {
            EditMode::Idle => "practicelog - Coding Practice Tracker".to_string(),
            EditMode::Editing(_) => format!("practicelog - Coding Practice Tracker (editing: {})", neutralize_line(&self.form.title)),
        };
        let title = Paragraph::new(title_text)
            .block(Block::default().borders(Borders::ALL).title("practicelog"))
            .style(Style::default().fg(Color::Cyan));
        frame.render_widget(title, chunks[0]);

        match self.mode {
            AppMode::List => self.render_list(frame, chunks[1]),
            AppMode::Form => self.render_form(frame, chunks[1]),
            AppMode::Search => self.render_search(frame, chunks[1]),
            AppMode::DeleteConfirm => self.render_delete_confirm(frame, chunks[1]),
            AppMode::Statistics => self.render_statistics(frame, chunks[1]),
            AppMode::Help => self.render_help(frame, chunks[1]),
        }

        // Status / help bar
        let (bottom_text, bottom_title, style) = match &self.status_message {
            Some(msg) => (msg.clone(), "Status", Style::default().fg(Color::Yellow)),
            None => (self.help_line().to_string(), "Help", Style::default().fg(Color::DarkGray)),
        };
        let bottom = Paragraph::new(bottom_text)
            .block(Block::default().borders(Borders::ALL).title(bottom_title))
            .style(style);
        frame.render_widget(bottom, chunks[2]);
    }

    fn help_line(&self) -> &'static str {
        match self.mode {
            AppMode::List => "j/k: navigate | n: form | e: edit | d: delete | /: topic | D: difficulty | a: all | s/S: sort | x: export | i: stats | ?: help | q: quit",
            AppMode::Form => "Tab/Shift+Tab: field | Enter: next field | Ctrl+S: save | Esc: back",
            AppMode::Search => "Enter: search | Esc: cancel",
            AppMode::DeleteConfirm => "Enter/y: confirm | Esc/n: cancel",
            AppMode::Statistics | AppMode::Help => "Esc: back",
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let view = self.view();
        if view.is_empty() {
            let empty = Paragraph::new(EMPTY_MESSAGE)
                .block(Block::default().borders(Borders::ALL).title("Problems"))
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, area);
            return;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let items: Vec<ListItem> = view
            .cards()
            .iter()
            .map(|card| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        card.title.as_str(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(vec![
                        Span::styled(format!("  {} ", card.topic), Style::default().fg(Color::Blue)),
                        Span::styled(format!("[{}] ", card.difficulty), difficulty_style(&card.difficulty)),
                        Span::styled(format!("📅 {}", card.date), Style::default().fg(Color::DarkGray)),
                    ]),
                ])
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(view.selected_index()));

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(format!("Problems ({})", view.cards().len())))
            .highlight_style(Style::default().fg(Color::Yellow).bg(Color::DarkGray))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, columns[0], &mut state);

        if let Some(card) = view.selected() {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Title: ", Style::default().fg(Color::Cyan)),
                    Span::raw(card.title.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Topic: ", Style::default().fg(Color::Cyan)),
                    Span::raw(card.topic.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Difficulty: ", Style::default().fg(Color::Cyan)),
                    Span::styled(card.difficulty.as_str(), difficulty_style(&card.difficulty)),
                ]),
                Line::from(vec![
                    Span::styled("Date: ", Style::default().fg(Color::Cyan)),
                    Span::raw(card.date.as_str()),
                ]),
                Line::default(),
            ];
            lines.extend(card.code.iter().map(|line| {
                Line::from(Span::styled(line.as_str(), Style::default().fg(Color::Green)))
            }));

            let detail = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Details (e: edit, d: delete)"));
            frame.render_widget(detail, columns[1]);
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        let fields = [
            (FormField::Title, self.form.title.as_str()),
            (FormField::Topic, self.form.topic.as_str()),
            (FormField::Difficulty, self.form.difficulty.as_str()),
            (FormField::Code, self.form.code.as_str()),
        ];
        for (i, (field, value)) in fields.into_iter().enumerate() {
            let focused = field == self.focused;
            let mut text = if field == FormField::Code {
                neutralize_block(value).join("\n")
            } else {
                neutralize_line(value)
            };
            if focused {
                text.push('_');
            }
            let title = if field == FormField::Code {
                format!("{} ({})", field.label(), self.edit_mode.submit_label())
            } else {
                field.label().to_string()
            };
            let style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let widget = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title(title).border_style(style));
            frame.render_widget(widget, rows[i]);
        }
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let label = match self.search_target {
            SearchTarget::Topic => "Search by topic",
            SearchTarget::Difficulty => "Search by difficulty",
        };
        let prompt = format!("> {}_", self.input_buffer);
        let search = Paragraph::new(prompt)
            .block(Block::default().borders(Borders::ALL).title(label))
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(search, area);
    }

    fn render_delete_confirm(&self, frame: &mut Frame, area: Rect) {
        let message = match &self.pending_delete {
            Some((_, title)) => format!(
                "Are you sure you want to delete this problem?\n\n{}\n\nPress Enter/y to confirm, Esc/n to cancel",
                title
            ),
            None => "Delete problem?".to_string(),
        };
        let confirm = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title("Confirm Delete"))
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Red));
        frame.render_widget(confirm, area);
    }

    fn render_statistics(&self, frame: &mut Frame, area: Rect) {
        let text = match &self.statistics {
            Some(stats) => format!(
                "Total problems: {}\n\nEasy: {}\nMedium: {}\nHard: {}\nOther: {}\n\nDistinct topics: {}",
                stats.total, stats.easy, stats.medium, stats.hard, stats.other, stats.unique_topics
            ),
            None => "No statistics loaded.".to_string(),
        };
        let widget = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Statistics"));
        frame.render_widget(widget, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let text = "\
List
  j/k, Up/Down   move selection
  n              open the form (add, or update while editing)
  e              edit the selected problem
  d              delete the selected problem
  /              search by topic
  D              search by difficulty
  a              view all
  s              sort by date, newest first (saved)
  S              sort by difficulty (saved)
  x              export all problems as HTML
  i              statistics
  q, Esc         quit

Form
  Tab/Shift+Tab  switch field
  Enter          next field (newline in code)
  Ctrl+S         save
  Esc            back to the list";
        let widget = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"));
        frame.render_widget(widget, area);
    }
}

fn difficulty_style(difficulty: &str) -> Style {
    match crate::service::problem_service::difficulty_rank(difficulty) {
        1 => Style::default().fg(Color::Green),
        2 => Style::default().fg(Color::Yellow),
        3 => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Magenta),
    }
}
