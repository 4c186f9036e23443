use anyhow::Result;
use clap::ValueEnum;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::collections::BTreeSet;
use std::io::stdout;

use crate::api::JobBoardApi;
use crate::detail::{ApplyOutcome, ApplyState, DetailFlow, DetailState};
use crate::models::JobListing;
use crate::render::{self, ListingView};
use crate::search::{SearchController, SortOrder};
use crate::session::Session;

struct AppState<'a> {
    search: &'a mut SearchController,
    api: &'a dyn JobBoardApi,
    session: Option<&'a Session>,
    jobs: Vec<JobListing>,
    selected: usize,
    scroll_offset: u16,
    flow: Option<DetailFlow>,
    applied: BTreeSet<String>,
    input: Option<String>,
    message: String,
}

impl<'a> AppState<'a> {
    fn new(search: &'a mut SearchController, api: &'a dyn JobBoardApi, session: Option<&'a Session>) -> Self {
        let mut state = Self {
            search,
            api,
            session,
            jobs: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            flow: None,
            applied: BTreeSet::new(),
            input: None,
            message: String::new(),
        };
        state.refresh();
        state
    }

    fn current_job(&self) -> Option<&JobListing> {
        self.jobs.get(self.selected)
    }

    /// Re-reads the result set after a search or sort change.
    fn refresh(&mut self) {
        self.jobs = self.search.listings();
        self.selected = self.selected.min(self.jobs.len().saturating_sub(1));
        self.scroll_offset = 0;
        self.select_flow();
    }

    fn select_flow(&mut self) {
        self.flow = self.current_job().map(|job| {
            let mut job = job.clone();
            job.has_applied |= self.applied.contains(&job.id);
            DetailFlow::from_listing(job)
        });
    }

    fn run_search(&mut self) {
        self.message = match self.search.run(self.api) {
            Ok(_) => render::heading(self.search.status(), self.search.listings().len()),
            Err(e) => format!("Search failed: {}", e),
        };
        self.selected = 0;
        self.refresh();
    }

    fn submit(&mut self, keyword: &str) {
        let location = self.search.filters().location.clone();
        self.search.submit(keyword, &location);
        self.run_search();
    }

    fn clear_filters(&mut self) {
        self.search.filter_store().clear();
        self.run_search();
    }

    fn cycle_sort(&mut self) -> SortOrder {
        let variants = SortOrder::value_variants();
        let idx = variants
            .iter()
            .position(|v| *v == self.search.sort())
            .unwrap_or(0);
        let next = variants[(idx + 1) % variants.len()];
        self.search.set_sort(next);
        self.refresh();
        next
    }

    fn apply(&mut self) {
        let Some(flow) = self.flow.as_mut() else { return };
        let outcome = flow.apply(self.session, self.api);
        self.message = match outcome {
            ApplyOutcome::RedirectToLogin => "Please log in first: careerconnect login".to_string(),
            ApplyOutcome::Rejected(reason) => reason,
            ApplyOutcome::Submitted => "Application submitted successfully!".to_string(),
            ApplyOutcome::AlreadyApplied => "You have already applied to this job".to_string(),
            ApplyOutcome::Failed(reason) => reason,
        };
        if flow.apply_state() == Some(ApplyState::Applied) {
            if let Some(job) = self.jobs.get(self.selected) {
                self.applied.insert(job.id.clone());
            }
        }
    }

    fn next(&mut self) {
        if !self.jobs.is_empty() && self.selected < self.jobs.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
            self.select_flow();
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
            self.select_flow();
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

pub fn run_browse(
    search: &mut SearchController,
    api: &dyn JobBoardApi,
    session: Option<&Session>,
) -> Result<()> {
    let mut state = AppState::new(search, api, session);
    state.message = render::heading(state.search.status(), state.jobs.len());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(input) = state.input.as_mut() {
                match key.code {
                    KeyCode::Enter => {
                        let keyword = std::mem::take(input);
                        state.input = None;
                        state.submit(&keyword);
                    }
                    KeyCode::Esc => state.input = None,
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) => input.push(c),
                    _ => {}
                }
                list_state.select(Some(state.selected));
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('/') => state.input = Some(state.search.filters().keyword.clone()),
                KeyCode::Char('a') => state.apply(),
                KeyCode::Char('c') => state.clear_filters(),
                KeyCode::Char('r') => state.run_search(),
                KeyCode::Char('s') => {
                    let sort = state.cycle_sort();
                    state.message = format!("Sorted by {}", sort_label(sort));
                }
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn sort_label(sort: SortOrder) -> String {
    sort.to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(frame.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[0]);

    // Left panel: result list
    let title = format!(
        " {} | {} filters active ",
        render::heading(state.search.status(), state.jobs.len()),
        state.search.filters().active_filter_count()
    );
    let items: Vec<ListItem> = match render::view_state(state.search.status(), &state.jobs) {
        ListingView::Populated(cards) => cards
            .iter()
            .map(|card| {
                let mark = if state.applied.contains(&card.id) { "+" } else { " " };
                let title = if card.title.chars().count() > 35 {
                    format!("{}...", card.title.chars().take(32).collect::<String>())
                } else {
                    card.title.clone()
                };
                ListItem::new(format!("{} {} | {}", mark, title, card.company))
            })
            .collect(),
        view => render::view_lines(&view).into_iter().map(ListItem::new).collect(),
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: listing detail
    let width = chunks[1].width.saturating_sub(2).max(20) as usize;
    let detail = build_detail(state, width);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    let status = match &state.input {
        Some(input) => format!(" keyword: {}_", input),
        None => format!(" {}  {}", state.message, state.search.address()),
    };
    frame.render_widget(Paragraph::new(status).style(Style::default().fg(Color::Yellow)), rows[1]);

    let help = Paragraph::new(
        " j/k:navigate  J/K:scroll  /:search  a:apply  c:clear filters  s:sort  r:refresh  q:quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[2]);
}

fn build_detail(state: &AppState, width: usize) -> Text<'static> {
    let Some(flow) = &state.flow else {
        return Text::raw("No job selected");
    };
    let DetailState::Found { job, apply } = flow.state() else {
        return Text::raw("Job not found");
    };

    let mut lines: Vec<Line> = Vec::new();
    let mut body = render::detail_lines(job, width).into_iter();

    if let Some(title) = body.next() {
        lines.push(Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    let (label, style) = match apply {
        ApplyState::NotApplied => ("Apply Now (a)", Style::default().fg(Color::Green)),
        ApplyState::Applying => ("Applying...", Style::default().fg(Color::Yellow)),
        ApplyState::Applied => ("Applied", Style::default().fg(Color::Cyan)),
    };
    lines.push(Line::from(Span::styled(label, style)));

    for line in body {
        let heading = matches!(
            line.as_str(),
            "Job Description" | "Required Skills" | "Benefits & Perks"
        ) || line.starts_with("About ");
        if heading {
            lines.push(Line::from(Span::styled(
                line,
                Style::default().add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(line));
        }
    }

    Text::from(lines)
}
