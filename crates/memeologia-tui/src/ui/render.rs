use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use memeologia_core::Route;

use crate::app::{App, AppState, LoginFocus};

use super::styles;

/// Visible width of the email and password fields
const FIELD_WIDTH: usize = 28;

/// Login dialog size
const LOGIN_WIDTH: u16 = 46;
const LOGIN_HEIGHT: u16 = 16;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app.route(), chunks[0]);

    match app.route() {
        Route::Login => render_login_form(frame, app, chunks[1]),
        Route::Home => render_home(frame, app, chunks[1]),
        Route::NotFound(path) => render_not_found(frame, path, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, route: &Route, area: Rect) {
    let title_line = Line::from(vec![
        Span::styled("  Memeologia", styles::title_style()),
        Span::styled(format!("  {}", route.path()), styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

/// Fit a field value into `width` columns, keeping the end visible.
fn fit_field(value: &str, width: usize) -> String {
    let count = value.chars().count();
    let visible: String = value.chars().skip(count.saturating_sub(width)).collect();
    format!("{:<width$}", visible, width = width)
}

fn field_line(value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::styled("[", styles::muted_style()),
        Span::styled(format!("{}{}", fit_field(value, FIELD_WIDTH), cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_login_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = app.login.render_form();
    let area = centered_rect_fixed(LOGIN_WIDTH, LOGIN_HEIGHT, area);

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("Iniciar Sesión", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled("Correo Electrónico", styles::muted_style())),
        field_line(form.email, app.login_focus == LoginFocus::Email),
        Line::from(Span::styled("Contraseña", styles::muted_style())),
        field_line(&form.password, app.login_focus == LoginFocus::Password),
    ];

    // Visibility toggle
    let toggle_label = if form.password_visible {
        "Ocultar contraseña"
    } else {
        "Mostrar contraseña"
    };
    let toggle_style = if app.login_focus == LoginFocus::Visibility {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    lines.push(Line::from(Span::styled(format!("({})", toggle_label), toggle_style)));
    lines.push(Line::from(""));

    // Submit control
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if !form.submit_enabled {
        styles::disabled_style()
    } else if button_focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    let button_text = if button_focused && form.submit_enabled {
        format!(" ▶ {} ◀ ", form.submit_label)
    } else {
        format!("   {}   ", form.submit_label)
    };
    lines.push(Line::from(vec![
        Span::raw("["),
        Span::styled(button_text, button_style),
        Span::raw("]"),
    ]));

    // Sign-up link
    let register_style = if app.login_focus == LoginFocus::Register {
        styles::selected_style()
    } else {
        styles::highlight_style()
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("¿No tienes una cuenta? ", styles::muted_style()),
        Span::styled("Regístrate aquí", register_style),
    ]));

    if let Some(error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.to_string(), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Bienvenido a Memeologia", styles::title_style())),
        Line::from(""),
    ];

    if let Some(ref data) = app.session.data {
        lines.push(Line::from(Span::styled(
            "Sesión iniciada",
            styles::success_style(),
        )));
        lines.push(Line::from(Span::styled(
            format!("desde {}", data.created_at.format("%Y-%m-%d %H:%M UTC")),
            styles::muted_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Sin sesión activa",
            styles::highlight_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_not_found(frame: &mut Frame, path: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("No hay nada en {}", path),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Pulsa ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" para volver", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = match app.route() {
        Route::Login => &[
            ("Tab", "siguiente campo"),
            ("Enter", "confirmar"),
            ("Ctrl+V", "mostrar contraseña"),
            ("Esc", "salir"),
        ],
        Route::Home => &[("l", "cerrar sesión"), ("q", "salir")],
        Route::NotFound(_) => &[("Esc", "volver"), ("q", "salir")],
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, desc) in hints {
        spans.push(Span::styled(*key, styles::help_key_style()));
        spans.push(Span::styled(format!(" {}  ", desc), styles::muted_style()));
    }

    if let Some(ref message) = app.status_message {
        spans.push(Span::styled(format!("| {}", message), styles::highlight_style()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(LOGIN_WIDTH, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "¿Seguro que quieres salir?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Pulsa ", styles::muted_style()),
            Span::styled("[S]", styles::help_key_style()),
            Span::styled(" para salir, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" para cancelar", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
