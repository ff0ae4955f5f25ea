pub mod app;
pub mod ui;

use std::{error::Error, io, sync::Arc, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::info;

use crate::auth::{IdentityProvider, User};
use crate::board::Board;
use crate::form::FormField;
use crate::storage::Prefs;
use crate::store::TaskStore;
use app::{App, Screen};
use ui::ui;

/// Runs the interactive board until the user quits.
pub async fn run_tui<S: TaskStore>(
    board: Board<S>,
    identity: Arc<dyn IdentityProvider>,
    prefs: Prefs,
) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(board, identity.clone(), prefs);

    // Session changes arrive from the identity provider; the loop drains them.
    let (tx, mut sessions) = mpsc::unbounded_channel::<Option<User>>();
    let subscription = identity.observe_session(Arc::new(move |user: Option<&User>| {
        let _ = tx.send(user.cloned());
    }));

    let res = run_app(&mut terminal, &mut app, &mut sessions).await;

    subscription.unsubscribe();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

async fn run_app<B: Backend, S: TaskStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    sessions: &mut mpsc::UnboundedReceiver<Option<User>>,
) -> io::Result<()> {
    loop {
        while let Ok(user) = sessions.try_recv() {
            info!(signed_in = user.is_some(), "session changed");
            app.set_user(user);
        }

        if app.needs_load {
            app.board.begin_load();
            terminal.draw(|f| ui(f, app))?;
            app.refresh().await;
        }

        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let quit = match app.screen {
            Screen::Login => handle_login_key(app, key).await,
            Screen::Board => handle_board_key(terminal, app, key).await?,
        };
        if quit {
            return Ok(());
        }
    }
}

async fn handle_login_key<S: TaskStore>(app: &mut App<S>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Tab | KeyCode::BackTab => app.login.toggle_field(),
        KeyCode::Enter => app.submit_login().await,
        KeyCode::F(2) => {
            app.login.sign_up = !app.login.sign_up;
            app.login.message = None;
        }
        KeyCode::F(3) => app.federated_login().await,
        KeyCode::F(4) => app.request_password_reset().await,
        KeyCode::Char(c) => app.login.push_char(c),
        KeyCode::Backspace => app.login.pop_char(),
        _ => {}
    }
    false
}

async fn handle_board_key<B: Backend, S: TaskStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    key: KeyEvent,
) -> io::Result<bool> {
    if app.board.form().is_open() {
        if key.code == KeyCode::Enter {
            app.submit_form().await;
            return Ok(false);
        }
        let form = app.board.form_mut();
        match key.code {
            KeyCode::Esc => form.cancel(),
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Right if form.focus() == FormField::Category => form.cycle_category(true),
            KeyCode::Left if form.focus() == FormField::Category => form.cycle_category(false),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
        return Ok(false);
    }

    let pending = if app.grab.is_some() {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                app.move_grab(-1, 0);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                app.move_grab(1, 0);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.move_grab(0, -1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.move_grab(0, 1);
                None
            }
            KeyCode::Enter | KeyCode::Char('m') => app.drop_grabbed(),
            KeyCode::Esc => app.cancel_grab(),
            _ => None,
        }
    } else {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Down | KeyCode::Char('j') => {
                app.next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.previous();
                None
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                app.next_column();
                None
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                app.previous_column();
                None
            }
            KeyCode::Char('a') => {
                app.start_add();
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                app.start_edit();
                None
            }
            KeyCode::Char('m') | KeyCode::Char(' ') => {
                app.start_grab();
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => app.begin_delete_selected(),
            KeyCode::Char('r') => {
                app.needs_load = true;
                None
            }
            KeyCode::Char('t') => {
                app.toggle_theme();
                None
            }
            KeyCode::Char('o') => {
                app.sign_out().await;
                None
            }
            KeyCode::Char('c') => {
                app.board.clear_notice();
                None
            }
            _ => None,
        }
    };

    // Show the local change before waiting on the backend.
    if let Some(pending) = pending {
        terminal.draw(|f| ui(f, app))?;
        app.commit(pending).await;
    }
    Ok(false)
}
