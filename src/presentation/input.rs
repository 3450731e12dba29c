use crate::application::{App, AppMode, StepInput};
use crate::infrastructure::{ClipboardService, QrImageFetcher, TicketExporter};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    app.should_quit = true;
                    return;
                }
                KeyCode::Char('r') => {
                    app.reset();
                    return;
                }
                _ => {}
            }
        }

        match app.mode {
            AppMode::Wizard => Self::handle_wizard_mode(app, key),
            AppMode::Ticket => Self::handle_ticket_mode(app, key),
            AppMode::QrModal => Self::handle_qr_modal_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_wizard_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::F(1) => {
                app.open_help();
                return;
            }
            KeyCode::Enter | KeyCode::Tab => {
                app.next_step();
                return;
            }
            KeyCode::Esc | KeyCode::BackTab => {
                app.previous_step();
                return;
            }
            _ => {}
        }

        match app.step_input() {
            Some(StepInput::ColorChoice) => Self::handle_color_choice(app, key),
            Some(StepInput::TicketCount) => Self::handle_ticket_count(app, key),
            Some(input @ (StepInput::Text | StepInput::Fare)) => {
                Self::handle_text_entry(app, key, input == StepInput::Fare)
            }
            Some(StepInput::Summary) | None => {}
        }
    }

    fn handle_color_choice(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.cycle_color(false),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char(' ') => app.cycle_color(true),
            KeyCode::Char(c @ '1'..='4') => app.select_color(c as usize - '1' as usize),
            _ => {}
        }
    }

    fn handle_ticket_count(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Right | KeyCode::Char('+') => app.adjust_ticket_count(true),
            KeyCode::Down | KeyCode::Left | KeyCode::Char('-') => app.adjust_ticket_count(false),
            KeyCode::Char(c @ '1'..='5') => app.set_ticket_count(c as u8 - b'0'),
            _ => {}
        }
    }

    fn handle_text_entry(app: &mut App, key: KeyCode, numeric: bool) {
        match key {
            KeyCode::Backspace => app.delete_before_cursor(),
            KeyCode::Delete => app.delete_at_cursor(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => {
                // Fare box behaves like a number input
                if numeric && !(c.is_ascii_digit() || c == '.') {
                    return;
                }
                app.insert_char(c);
            }
            _ => {}
        }
    }

    fn handle_ticket_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('s') | KeyCode::Enter => Self::show_qr(app),
            KeyCode::Char('c') => {
                let Some(id) = app.wizard.ticket().map(|t| t.transaction_id().to_string()) else {
                    return;
                };
                let result = ClipboardService::copy_text(&id);
                app.set_copy_result("transaction ID", result);
            }
            KeyCode::Char('j') => {
                let Some(json) = app.wizard.ticket().map(|t| TicketExporter::to_json(&t)) else {
                    return;
                };
                let result = json.and_then(|json| ClipboardService::copy_text(&json));
                app.set_copy_result("ticket JSON", result);
            }
            KeyCode::Char('n') => app.reset(),
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::F(1) | KeyCode::Char('?') => app.open_help(),
            _ => {}
        }
    }

    fn show_qr(app: &mut App) {
        let pending = if app.needs_qr_fetch() {
            app.wizard
                .ticket()
                .map(|t| QrImageFetcher::spawn(app.qr_endpoint.clone(), t.qr_payload().to_string()))
        } else {
            None
        };
        app.open_qr_modal(pending);
    }

    fn handle_qr_modal_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('s') => app.close_qr_modal(),
            KeyCode::Char('c') => {
                let Some(payload) = app.wizard.ticket().map(|t| t.qr_payload().to_string()) else {
                    return;
                };
                let result = ClipboardService::copy_text(&payload);
                app.set_copy_result("QR data", result);
            }
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.close_help();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }
}
