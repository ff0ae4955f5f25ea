use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::app::{App, LoginField, Screen, Theme};
use crate::board::LoadState;
use crate::due::DueStatus;
use crate::form::FormField;
use crate::models::{Category, Task};
use crate::store::TaskStore;

struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    selected: Color,
}

fn palette(theme: Theme) -> Palette {
    if theme.dark {
        Palette {
            bg: Color::Black,
            fg: Color::White,
            muted: Color::Gray,
            accent: Color::Cyan,
            selected: Color::DarkGray,
        }
    } else {
        Palette {
            bg: Color::White,
            fg: Color::Black,
            muted: Color::DarkGray,
            accent: Color::Blue,
            selected: Color::Gray,
        }
    }
}

fn column_color(category: Category) -> Color {
    match category {
        Category::Todo => Color::Yellow,
        Category::InProgress => Color::Cyan,
        Category::Done => Color::Green,
    }
}

pub fn ui<S: TaskStore>(f: &mut Frame, app: &App<S>) {
    let p = palette(app.theme);
    f.render_widget(Block::default().style(Style::default().bg(p.bg).fg(p.fg)), f.area());

    match app.screen {
        Screen::Login => login_screen(f, app, &p),
        Screen::Board => board_screen(f, app, &p),
    }
}

fn login_screen<S: TaskStore>(f: &mut Frame, app: &App<S>, p: &Palette) {
    let area = centered_rect(60, 11, f.area());
    f.render_widget(Clear, area);

    let login = &app.login;
    let title = if login.sign_up { "Task Board - Sign Up" } else { "Task Board - Sign In" };
    let field_style = |field: LoginField| {
        if login.field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(p.fg)
        }
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Email:    ", field_style(LoginField::Email)),
            Span::raw(login.email.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Password: ", field_style(LoginField::Password)),
            Span::raw("*".repeat(login.password.chars().count())),
        ]),
        Line::from(""),
    ];
    if let Some(message) = &login.message {
        lines.push(Line::from(Span::styled(message.as_str(), Style::default().fg(Color::Red))));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab: Field | Enter: Submit | F2: Sign in/up | F3: Federated | F4: Reset password | Esc: Quit",
        Style::default().fg(p.muted),
    )));

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(p.accent)),
    );
    f.render_widget(form, area);
}

fn board_screen<S: TaskStore>(f: &mut Frame, app: &App<S>, p: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Columns
            Constraint::Length(1), // Status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let who = app.user.as_ref().map(|u| u.email.as_str()).unwrap_or("");
    let header = Paragraph::new(Line::from(vec![
        Span::styled("Task Board", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", who), Style::default().fg(p.muted)),
    ]));
    f.render_widget(header, chunks[0]);

    match app.board.load_state() {
        LoadState::NotLoaded | LoadState::Loading => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(p.muted))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(loading, chunks[1]);
        }
        LoadState::Loaded | LoadState::Failed(_) => columns(f, app, p, chunks[1]),
    }

    if let Some((message, is_error)) = app.status() {
        let color = if is_error { Color::Red } else { Color::Green };
        f.render_widget(Paragraph::new(message).style(Style::default().fg(color)), chunks[2]);
    }

    let help_text = if app.board.form().is_open() {
        "Tab/Shift-Tab: Field | ←/→ on Category: Change | Enter: Save | Esc: Cancel"
    } else if app.grab.is_some() {
        "Arrows: Move marker | Enter: Drop | Esc: Cancel"
    } else {
        "q: Quit | a: Add | e: Edit | d: Del | m: Grab | r: Refresh | t: Theme | o: Sign out"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(p.muted))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);

    if app.board.form().is_open() {
        form_popup(f, app, p);
    }
}

fn columns<S: TaskStore>(f: &mut Frame, app: &App<S>, p: &Palette, area: Rect) {
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);
    let today = Local::now().date_naive();

    for (category, column) in app.board.tasks().iter() {
        let mut items: Vec<ListItem> = column.iter().map(|t| task_item(t, today, p)).collect();

        // Drop marker: where the grabbed task would land.
        if let Some(grab) = &app.grab {
            if grab.target.category == category {
                let at = grab.target.index.min(items.len());
                let marker = ListItem::new(Line::from(Span::styled(
                    format!("──▶ drop here ({})", grab.id),
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                )));
                items.insert(at, marker);
            }
        }

        let focused = app.selected.category == category;
        let border = if focused { column_color(category) } else { p.muted };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} ({})", category, column.len()))
                    .border_style(Style::default().fg(border)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(p.selected))
            .highlight_symbol(">> ");

        let mut state = ListState::default();
        if focused && app.grab.is_none() && !column.is_empty() {
            state.select(Some(app.selected.index));
        }
        f.render_stateful_widget(list, areas[category.index()], &mut state);
    }
}

fn task_item<'a>(task: &'a Task, today: chrono::NaiveDate, p: &Palette) -> ListItem<'a> {
    let status = DueStatus::of(task, today);
    let due_style = if status.is_pressing() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(p.muted)
    };
    let mut title = vec![Span::styled(task.title.as_str(), Style::default().add_modifier(Modifier::BOLD))];
    if let Some(due) = task.due_date {
        title.push(Span::styled(format!("  {} {}", due, status.label()), due_style));
    }
    let mut lines = vec![Line::from(title)];
    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(task.description.as_str(), Style::default().fg(p.muted))));
    }
    ListItem::new(lines)
}

fn form_popup<S: TaskStore>(f: &mut Frame, app: &App<S>, p: &Palette) {
    let form = app.board.form();
    let Some(draft) = form.draft() else {
        return;
    };
    let area = centered_rect(60, 10, f.area());
    f.render_widget(Clear, area);

    let row = |field: FormField, value: String| {
        let style = if form.focus() == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(p.fg)
        };
        Line::from(vec![
            Span::styled(format!("{:<18}", field.label()), style),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        row(FormField::Title, draft.title.clone()),
        row(FormField::Description, draft.description.clone()),
        row(FormField::DueDate, draft.due_date.clone()),
        row(FormField::Category, format!("< {} >", draft.category)),
        Line::from(""),
    ];
    if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))));
    }

    let title = if draft.id.is_some() { "Edit Task" } else { "Add Task" };
    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(p.accent))
            .style(Style::default().bg(p.bg)),
    );
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height - height) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height - height) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
