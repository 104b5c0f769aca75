//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use memeologia_core::navigation::ROOT_PATH;
use memeologia_core::{Navigator, Route};

use crate::app::{is_valid_input_char, App, AppState, LoginFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('y') | KeyCode::Char('Y')
            | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    let route = app.route().clone();
    match route {
        Route::Login => handle_login_input(app, key),
        Route::Home => {
            handle_home_input(app, key);
            false
        }
        Route::NotFound(_) => {
            handle_not_found_input(app, key);
            false
        }
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    // Ctrl+V toggles visibility from any field
    if key.code == KeyCode::Char('v') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.login.toggle_password_visibility();
        return false;
    }

    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password => {
                app.login_focus = LoginFocus::Button;
            }
            LoginFocus::Visibility => {
                app.login.toggle_password_visibility();
            }
            LoginFocus::Button => {
                // Ignored while a request is pending
                app.submit_login();
            }
            LoginFocus::Register => app.open_register(),
        },
        KeyCode::Char(' ') if app.login_focus == LoginFocus::Visibility => {
            app.login.toggle_password_visibility();
        }
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login.credentials.email.pop();
            }
            LoginFocus::Password => {
                app.login.credentials.password.pop();
            }
            LoginFocus::Visibility | LoginFocus::Button | LoginFocus::Register => {}
        },
        KeyCode::Char(c) if is_valid_input_char(c) => match app.login_focus {
            LoginFocus::Email => app.login.credentials.email.push(c),
            LoginFocus::Password => app.login.credentials.password.push(c),
            LoginFocus::Visibility | LoginFocus::Button | LoginFocus::Register => {
                // Ignore character input on controls
            }
        },
        _ => {}
    }
    false
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('l') => app.logout(),
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}

fn handle_not_found_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            if !app.router.back() {
                app.router.push(ROOT_PATH);
            }
        }
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}
