use {
    crate::{
        query::{QueryError, QueryProjector},
        refresh::{RefreshOutcome, RefreshService},
        ui::app::{Action, App, StatusKind},
    },
    crossterm::event::{Event, KeyEventKind},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{io::Stdout, time::Duration},
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Read and write paths the UI drives
pub struct Services {
    pub projector: QueryProjector,
    pub refresher: RefreshService,
    /// Clans named on the command line, listed even before they have data
    pub extra_clans: Vec<String>,
}

/// Run the TUI event loop until the user quits
pub async fn run_ui(services: Services) -> Result<(), Box<dyn std::error::Error>> {
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, &services).await;

    // Restore the terminal even when the loop failed
    let restored = restore_terminal();
    loop_then_restore(result, restored)
}

/// A loop error wins over a restore error
fn loop_then_restore(
    result: Result<(), Box<dyn std::error::Error>>,
    restored: std::io::Result<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    result?;
    restored?;
    Ok(())
}

fn restore_terminal() -> std::io::Result<()> {
    let left = crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    );
    let raw = crossterm::terminal::disable_raw_mode();
    left.and(raw)
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    services: &Services,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(Vec::new());
    reload(&mut app, services);

    loop {
        terminal.draw(|f| {
            let area = f.size();
            crate::ui::layout::render_layout(f, area, &app);
        })?;

        if !crossterm::event::poll(POLL_INTERVAL)? {
            continue;
        }

        let Event::Key(key) = crossterm::event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.on_key(key.code) {
            Action::None => {}
            Action::Quit => break,
            Action::LoadClan => load_seasons(&mut app, &services.projector),
            Action::Reload => reload(&mut app, services),
            Action::Refresh => {
                let Some(clan) = app.selected_clan_tag() else {
                    continue;
                };

                app.set_status(StatusKind::Info, format!("Updating {}...", clan));
                terminal.draw(|f| {
                    let area = f.size();
                    crate::ui::layout::render_layout(f, area, &app);
                })?;

                match services.refresher.refresh(&clan).await {
                    Ok(RefreshOutcome::Updated { seasons, players }) => {
                        reload(&mut app, services);
                        app.set_status(
                            StatusKind::Success,
                            format!(
                                "Updated! {} seasons, {} player records at {}",
                                seasons.len(),
                                players,
                                chrono::Local::now().format("%H:%M:%S")
                            ),
                        );
                    }
                    Ok(RefreshOutcome::NoData { reason }) => {
                        app.set_status(StatusKind::Error, format!("No data: {}", reason));
                    }
                    Err(e) => {
                        log::error!("Refresh of {} failed: {}", clan, e);
                        app.set_status(StatusKind::Error, format!("Update failed: {}", e));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Re-read the clan list and the selected clan's seasons
fn reload(app: &mut App, services: &Services) {
    match services.projector.list_clans() {
        Ok(mut clans) => {
            clans.extend(services.extra_clans.iter().cloned());
            clans.sort();
            clans.dedup();
            app.set_clans(clans);
        }
        Err(e) => {
            app.set_status(StatusKind::Error, e.to_string());
            return;
        }
    }
    load_seasons(app, &services.projector);
}

fn load_seasons(app: &mut App, projector: &QueryProjector) {
    let Some(clan) = app.selected_clan_tag() else {
        app.clear_seasons();
        return;
    };

    match projector.project(&clan) {
        Ok(seasons) => {
            let count = seasons.len();
            app.set_seasons(seasons);
            app.set_status(StatusKind::Info, format!("{}: {} seasons stored", clan, count));
        }
        Err(QueryError::NoData(_)) => {
            app.clear_seasons();
            app.set_status(
                StatusKind::Info,
                format!("No data for clan {} yet, press u to fetch", clan),
            );
        }
        Err(e @ QueryError::Storage(_)) => {
            app.clear_seasons();
            app.set_status(StatusKind::Error, e.to_string());
        }
    }
}
