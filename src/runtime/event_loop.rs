use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::engine::RepeatMode;
use crate::mpris::ControlCmd;
use crate::presence::PresenceSignal;
use crate::ui;

use super::startup::Runtime;

/// Main terminal event loop: drains snapshot channels, draws, and turns key
/// presses and remote commands into controller calls. Returns `Ok(())` when
/// shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    rt: &mut Runtime,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(update) = rt.library_rx.try_recv() {
            rt.app.apply_library(update);
        }
        while let Ok(snapshot) = rt.playback_rx.try_recv() {
            rt.app.apply_playback(snapshot);
        }
        while let Ok(signal) = rt.presence_rx.try_recv() {
            match signal {
                // The user dismissed the status surface; playback is torn
                // down in Runtime::teardown.
                PresenceSignal::Teardown => return Ok(()),
            }
        }
        while let Ok(cmd) = rt.control_rx.try_recv() {
            handle_control_cmd(cmd, rt);
        }

        if rt.app.should_quit {
            return Ok(());
        }

        terminal.draw(|f| ui::draw(f, &rt.app, &rt.settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key_event(key, rt);
            }
        }
    }
}

fn play_selected(rt: &mut Runtime) {
    if let Some(track) = rt.app.selected_track() {
        rt.controller
            .set_queue_and_play(rt.app.tracks().to_vec(), track.id);
    }
}

fn handle_control_cmd(cmd: ControlCmd, rt: &mut Runtime) {
    match cmd {
        // `Quit` over MPRIS is the dismissal gesture.
        ControlCmd::Quit => rt.presence.dismissed(),
        ControlCmd::Play => rt.controller.resume(),
        ControlCmd::Pause => rt.controller.pause(),
        ControlCmd::PlayPause => {
            if rt.app.playback.queue_ids.is_empty() && rt.app.has_tracks() {
                play_selected(rt);
            } else {
                rt.controller.toggle_play_pause();
            }
        }
        ControlCmd::Stop => rt.controller.stop_and_reset(),
        ControlCmd::Next => rt.controller.next(),
        ControlCmd::Prev => rt.controller.previous(),
        ControlCmd::OpenDetail => {
            let current = rt.app.playback.current_track_id;
            rt.app.request_detail(current);
        }
    }
}

fn handle_key_event(key: KeyEvent, rt: &mut Runtime) {
    match key.code {
        KeyCode::Char('q') => {
            rt.app.quit();
        }
        KeyCode::Esc if rt.app.detail_open => {
            rt.app.close_detail();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            rt.app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            rt.app.prev();
        }
        KeyCode::Enter => {
            if rt.app.has_tracks() {
                play_selected(rt);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            if rt.app.playback.queue_ids.is_empty() && rt.app.has_tracks() {
                play_selected(rt);
            } else {
                rt.controller.toggle_play_pause();
            }
        }
        KeyCode::Char('l') => {
            rt.controller.next();
        }
        KeyCode::Char('h') => {
            rt.controller.previous();
        }
        KeyCode::Char('L') => {
            let step = rt.settings.controls.seek_seconds * 1_000;
            rt.controller
                .seek_to(rt.app.playback.position_ms.saturating_add(step));
        }
        KeyCode::Char('H') => {
            let step = rt.settings.controls.seek_seconds * 1_000;
            rt.controller
                .seek_to(rt.app.playback.position_ms.saturating_sub(step));
        }
        KeyCode::Char('s') => {
            rt.controller
                .set_shuffle_enabled(!rt.app.playback.shuffle_enabled);
        }
        KeyCode::Char('r') => {
            let next = match rt.app.playback.repeat_mode {
                RepeatMode::All => RepeatMode::One,
                RepeatMode::One => RepeatMode::All,
            };
            rt.controller.set_repeat_mode(next);
        }
        KeyCode::Char('d') => {
            rt.app.toggle_detail();
        }
        KeyCode::Char('R') => {
            rt.feed.rescan();
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            rt.app.quit();
        }
        _ => {}
    }
}
