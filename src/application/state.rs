//! Application state management for the terminal booking screen.
//!
//! This module contains the main application state and mode management
//! for the terminal user interface. Booking rules live in the wizard
//! controller; `App` only tracks what the screen needs around it.

use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::warn;

use crate::application::{AdvanceOutcome, MockConfig, StepInput, WizardController};
use crate::domain::{BookingField, BusColor, WizardPhase};
use crate::infrastructure::{InfrastructureError, QrEndpoint, QrImage};

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Collecting booking details step by step
    Wizard,
    /// Showing the issued ticket
    Ticket,
    /// QR code modal over the ticket
    QrModal,
    /// Help screen is displayed
    Help,
}

/// Progress of the QR image request for the current ticket.
#[derive(Debug, Clone, PartialEq)]
pub enum QrImageState {
    Idle,
    Loading,
    Ready(QrImage),
}

/// Main application state containing the wizard and UI state.
///
/// # Examples
///
/// ```
/// use busticket::application::{App, AppMode};
///
/// let app = App::default();
/// assert_eq!(app.mode, AppMode::Wizard);
/// assert!(app.input.is_empty());
/// ```
#[derive(Debug)]
pub struct App {
    /// The booking wizard
    pub wizard: WizardController,
    /// Current application mode
    pub mode: AppMode,
    /// Text buffer for the current step's field
    pub input: String,
    /// Cursor position within the input buffer, in characters
    pub cursor_position: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Where the QR renderer lives
    pub qr_endpoint: QrEndpoint,
    /// QR image for the issued ticket
    pub qr_image: QrImageState,
    /// Set when the user asks to leave
    pub should_quit: bool,
    mode_before_help: AppMode,
    qr_receiver: Option<Receiver<QrImage>>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(MockConfig::default(), QrEndpoint::default())
    }
}

impl App {
    pub fn new(config: MockConfig, qr_endpoint: QrEndpoint) -> Self {
        Self {
            wizard: WizardController::new(config),
            mode: AppMode::Wizard,
            input: String::new(),
            cursor_position: 0,
            status_message: None,
            help_scroll: 0,
            qr_endpoint,
            qr_image: QrImageState::Idle,
            should_quit: false,
            mode_before_help: AppMode::Wizard,
            qr_receiver: None,
        }
    }

    /// Input kind of the step on screen, `None` once the ticket is issued.
    pub fn step_input(&self) -> Option<StepInput> {
        self.wizard.current_step().map(|row| row.input)
    }

    fn step_field(&self) -> Option<BookingField> {
        self.wizard.current_step().and_then(|row| row.field)
    }

    fn is_text_step(&self) -> bool {
        matches!(self.step_input(), Some(StepInput::Text | StepInput::Fare))
    }

    /// Loads the current step's stored value into the input buffer.
    pub fn load_step_input(&mut self) {
        self.input = match (self.is_text_step(), self.step_field()) {
            (true, Some(field)) => self.wizard.record().text(field),
            _ => String::new(),
        };
        self.cursor_position = self.input.chars().count();
    }

    /// Pushes the input buffer into the booking record.
    ///
    /// A fare that does not parse clears the stored fare so a stale value
    /// can never be used to move on.
    fn sync_input(&mut self) {
        let Some(field) = self.step_field() else {
            return;
        };
        match self.wizard.set_field(field, &self.input) {
            Ok(()) => {
                self.status_message = None;
                if field == BookingField::BusNumber {
                    // Uppercasing may expand a char (ß -> SS); keep the cursor
                    // after the same typed text.
                    let before_cursor = &self.input[..self.byte_offset(self.cursor_position)];
                    self.cursor_position = before_cursor.to_uppercase().chars().count();
                    self.input = self.wizard.record().bus_number.clone();
                }
            }
            Err(e) => {
                if let Err(clear_err) = self.wizard.set_field(field, "") {
                    warn!(field = field.name(), error = %clear_err, "could not clear field");
                }
                self.status_message = Some(e.to_string());
            }
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.input.len())
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.is_text_step() {
            return;
        }
        let offset = self.byte_offset(self.cursor_position);
        self.input.insert(offset, c);
        self.cursor_position += 1;
        self.sync_input();
    }

    pub fn delete_before_cursor(&mut self) {
        if !self.is_text_step() || self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let offset = self.byte_offset(self.cursor_position);
        self.input.remove(offset);
        self.sync_input();
    }

    pub fn delete_at_cursor(&mut self) {
        if !self.is_text_step() || self.cursor_position >= self.input.chars().count() {
            return;
        }
        let offset = self.byte_offset(self.cursor_position);
        self.input.remove(offset);
        self.sync_input();
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    /// Picks a bus colour by its position in [`BusColor::ALL`].
    pub fn select_color(&mut self, index: usize) {
        if self.step_input() != Some(StepInput::ColorChoice) {
            return;
        }
        if let Some(color) = BusColor::ALL.get(index) {
            match self.wizard.set_field(BookingField::BusColor, color.label()) {
                Ok(()) => self.status_message = None,
                Err(e) => self.status_message = Some(e.to_string()),
            }
        }
    }

    /// Moves the colour selection up or down, wrapping around.
    pub fn cycle_color(&mut self, forward: bool) {
        let len = BusColor::ALL.len();
        let next = match self.wizard.record().bus_color {
            None if forward => 0,
            None => len - 1,
            Some(color) if forward => (color.index() + 1) % len,
            Some(color) => (color.index() + len - 1) % len,
        };
        self.select_color(next);
    }

    pub fn set_ticket_count(&mut self, count: u8) {
        if self.step_input() != Some(StepInput::TicketCount) {
            return;
        }
        match self.wizard.set_field(BookingField::TicketCount, &count.to_string()) {
            Ok(()) => self.status_message = None,
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    pub fn adjust_ticket_count(&mut self, increase: bool) {
        let current = self.wizard.record().ticket_count;
        let next = if increase {
            current.increment()
        } else {
            current.decrement()
        };
        self.set_ticket_count(next.get());
    }

    /// "Next" / "Generate Ticket".
    pub fn next_step(&mut self) {
        match self.wizard.advance() {
            Ok(AdvanceOutcome::Moved(_)) => {
                self.status_message = None;
                self.load_step_input();
            }
            Ok(AdvanceOutcome::Finalized) => {
                self.mode = AppMode::Ticket;
                self.input.clear();
                self.cursor_position = 0;
                self.status_message = Some("Ticket booked successfully".to_string());
            }
            Ok(AdvanceOutcome::Blocked(blocked)) => {
                self.status_message = Some(blocked.reason.to_string());
            }
            Ok(AdvanceOutcome::AlreadyFinalized) => {}
            Err(e) => {
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// "Back".
    pub fn previous_step(&mut self) {
        if self.wizard.retreat().is_some() {
            self.status_message = None;
            self.load_step_input();
        }
    }

    /// "Book Another Ticket": discards the booking and any QR request.
    pub fn reset(&mut self) {
        self.wizard.reset();
        self.mode = AppMode::Wizard;
        self.input.clear();
        self.cursor_position = 0;
        self.qr_image = QrImageState::Idle;
        self.qr_receiver = None;
        self.status_message = Some("Started a new booking".to_string());
    }

    pub fn open_help(&mut self) {
        if self.mode != AppMode::Help {
            self.mode_before_help = self.mode;
            self.mode = AppMode::Help;
            self.help_scroll = 0;
        }
    }

    pub fn close_help(&mut self) {
        if self.mode == AppMode::Help {
            self.mode = self.mode_before_help;
        }
    }

    /// Whether opening the QR modal should start a new image request.
    pub fn needs_qr_fetch(&self) -> bool {
        self.wizard.phase() == WizardPhase::Finalized && self.qr_image == QrImageState::Idle
    }

    /// Shows the QR modal; `pending` carries a newly started image request.
    pub fn open_qr_modal(&mut self, pending: Option<Receiver<QrImage>>) {
        if self.wizard.phase() != WizardPhase::Finalized {
            return;
        }
        if let Some(rx) = pending {
            self.qr_receiver = Some(rx);
            self.qr_image = QrImageState::Loading;
        }
        self.mode = AppMode::QrModal;
    }

    pub fn close_qr_modal(&mut self) {
        if self.mode == AppMode::QrModal {
            self.mode = AppMode::Ticket;
        }
    }

    /// Picks up a finished QR request, if any. Called every loop tick.
    pub fn poll_qr_image(&mut self) {
        let Some(rx) = &self.qr_receiver else {
            return;
        };
        match rx.try_recv() {
            Ok(image) => {
                self.qr_image = QrImageState::Ready(image);
                self.qr_receiver = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.qr_image =
                    QrImageState::Ready(QrImage::placeholder(None, "QR request was interrupted"));
                self.qr_receiver = None;
            }
        }
    }

    /// Processes the result of a clipboard copy.
    pub fn set_copy_result(&mut self, what: &str, result: Result<(), InfrastructureError>) {
        self.status_message = Some(match result {
            Ok(()) => format!("Copied {what} to clipboard"),
            Err(e) => format!("Copy failed: {e}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn offline_app() -> App {
        App::new(
            MockConfig::default(),
            QrEndpoint {
                offline: true,
                ..QrEndpoint::default()
            },
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    fn book(app: &mut App) {
        app.select_color(0);
        app.next_step();
        type_text(app, "dl1pd6008");
        app.next_step();
        type_text(app, "740");
        app.next_step();
        type_text(app, "A");
        app.next_step();
        type_text(app, "B");
        app.next_step();
        type_text(app, "10");
        app.next_step();
        app.set_ticket_count(2);
        app.next_step();
        app.next_step();
    }

    #[test]
    fn test_app_default() {
        let app = App::default();
        assert_eq!(app.mode, AppMode::Wizard);
        assert!(app.input.is_empty());
        assert_eq!(app.cursor_position, 0);
        assert!(app.status_message.is_none());
        assert_eq!(app.qr_image, QrImageState::Idle);
        assert!(!app.should_quit);
        assert_eq!(app.step_input(), Some(StepInput::ColorChoice));
    }

    #[test]
    fn test_blocked_next_sets_status() {
        let mut app = offline_app();
        app.next_step();
        assert_eq!(app.status_message.as_deref(), Some("Pick a bus type to continue"));
        assert_eq!(app.wizard.state().step().number(), 1);
    }

    #[test]
    fn test_typing_updates_record() {
        let mut app = offline_app();
        app.select_color(1);
        app.next_step();

        type_text(&mut app, "dl1pd");
        assert_eq!(app.input, "DL1PD");
        assert_eq!(app.wizard.record().bus_number, "DL1PD");

        app.move_cursor_home();
        app.delete_at_cursor();
        assert_eq!(app.wizard.record().bus_number, "L1PD");
        app.move_cursor_end();
        app.delete_before_cursor();
        assert_eq!(app.wizard.record().bus_number, "L1P");
    }

    #[test]
    fn test_uppercase_expansion_keeps_cursor_after_typed_text() {
        let mut app = offline_app();
        app.select_color(0);
        app.next_step();

        type_text(&mut app, "ßa");
        assert_eq!(app.input, "SSA");
        assert_eq!(app.cursor_position, 3);

        app.move_cursor_home();
        app.move_cursor_right();
        type_text(&mut app, "ﬁ");
        assert_eq!(app.input, "SFISA");
        assert_eq!(app.cursor_position, 3);
        type_text(&mut app, "x");
        assert_eq!(app.wizard.record().bus_number, "SFIXSA");
    }

    #[test]
    fn test_color_selection_clears_blocked_message() {
        let mut app = offline_app();
        app.next_step();
        assert!(app.status_message.is_some());

        app.select_color(3);
        assert_eq!(app.status_message, None);
        assert_eq!(app.wizard.record().bus_color, Some(BusColor::Orange));
    }

    #[test]
    fn test_unicode_input_does_not_split_chars() {
        let mut app = offline_app();
        app.select_color(0);
        app.next_step();
        type_text(&mut app, "X");
        app.next_step();

        type_text(&mut app, "नई");
        app.move_cursor_left();
        app.insert_char('-');
        assert_eq!(app.wizard.record().bus_route, "न-ई");
        app.delete_before_cursor();
        assert_eq!(app.wizard.record().bus_route, "नई");
    }

    #[test]
    fn test_invalid_fare_clears_stored_fare() {
        let mut app = offline_app();
        app.select_color(0);
        app.next_step();
        for text in ["X", "Y", "A", "B"] {
            type_text(&mut app, text);
            app.next_step();
        }
        assert_eq!(app.step_input(), Some(StepInput::Fare));

        type_text(&mut app, "12");
        assert_eq!(app.wizard.record().fare, Some(12.0));
        type_text(&mut app, "x");
        assert_eq!(app.wizard.record().fare, None);
        assert!(app.status_message.is_some());

        app.next_step();
        assert_eq!(app.wizard.state().step().number(), 6);
    }

    #[test]
    fn test_cycle_color_wraps() {
        let mut app = offline_app();
        app.cycle_color(false);
        assert_eq!(app.wizard.record().bus_color, Some(BusColor::Orange));
        app.cycle_color(true);
        assert_eq!(app.wizard.record().bus_color, Some(BusColor::Red));
        app.cycle_color(true);
        assert_eq!(app.wizard.record().bus_color, Some(BusColor::BlueDark));
    }

    #[test]
    fn test_back_reloads_input() {
        let mut app = offline_app();
        app.select_color(0);
        app.next_step();
        type_text(&mut app, "dl1");
        app.next_step();
        assert!(app.input.is_empty());

        app.previous_step();
        assert_eq!(app.input, "DL1");
        assert_eq!(app.cursor_position, 3);
    }

    #[test]
    fn test_full_booking_switches_to_ticket() {
        let mut app = offline_app();
        book(&mut app);

        assert_eq!(app.mode, AppMode::Ticket);
        let ticket = app.wizard.ticket().unwrap();
        assert_eq!(ticket.discounted_fare(), 9.0);
        assert_eq!(ticket.booking.ticket_count.get(), 2);
        assert_eq!(ticket.booking.bus_number, "DL1PD6008");
    }

    #[test]
    fn test_qr_modal_lifecycle() {
        let mut app = offline_app();
        app.open_qr_modal(None);
        assert_eq!(app.mode, AppMode::Wizard); // nothing to show yet

        book(&mut app);
        assert!(app.needs_qr_fetch());

        let (tx, rx) = mpsc::channel();
        app.open_qr_modal(Some(rx));
        assert_eq!(app.mode, AppMode::QrModal);
        assert_eq!(app.qr_image, QrImageState::Loading);

        app.poll_qr_image();
        assert_eq!(app.qr_image, QrImageState::Loading);

        tx.send(QrImage::placeholder(None, "offline mode")).unwrap();
        app.poll_qr_image();
        assert!(matches!(app.qr_image, QrImageState::Ready(QrImage::Placeholder { .. })));
        assert!(!app.needs_qr_fetch());

        app.close_qr_modal();
        assert_eq!(app.mode, AppMode::Ticket);
    }

    #[test]
    fn test_dropped_qr_worker_yields_placeholder() {
        let mut app = offline_app();
        book(&mut app);
        let (tx, rx) = mpsc::channel::<QrImage>();
        app.open_qr_modal(Some(rx));
        drop(tx);
        app.poll_qr_image();
        assert!(matches!(app.qr_image, QrImageState::Ready(ref image) if image.is_placeholder()));
    }

    #[test]
    fn test_reset_returns_to_wizard() {
        let mut app = offline_app();
        book(&mut app);
        app.reset();

        assert_eq!(app.mode, AppMode::Wizard);
        assert_eq!(app.qr_image, QrImageState::Idle);
        assert!(app.wizard.ticket().is_none());
        assert_eq!(app.wizard.state().step().number(), 1);
    }

    #[test]
    fn test_help_returns_to_previous_mode() {
        let mut app = offline_app();
        book(&mut app);
        app.open_help();
        assert_eq!(app.mode, AppMode::Help);
        app.close_help();
        assert_eq!(app.mode, AppMode::Ticket);
    }
}
