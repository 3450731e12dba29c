//! The eight-step booking wizard.
//!
//! Each step is a row in [`STEPS`]: what to show, which field it collects
//! and the predicate that must hold before the wizard moves on. The
//! controller only walks that table, so adding or reordering steps never
//! touches the transition logic.

use std::fmt;

use rand::Rng;
use rand::rngs::ThreadRng;
use tracing::{debug, info, warn};

use super::booking::BookingState;
use super::config::MockConfig;
use crate::domain::{
    BookingField, BookingRecord, DomainError, DomainResult, FareCalculator, IdentifierGenerator,
    Ticket, WizardPhase, WizardStep,
};

/// How a step collects its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput {
    ColorChoice,
    Text,
    Fare,
    TicketCount,
    Summary,
}

/// One row of the step table.
#[derive(Debug)]
pub struct StepDescriptor {
    pub title: &'static str,
    pub hint: &'static str,
    pub placeholder: &'static str,
    pub field: Option<BookingField>,
    pub input: StepInput,
    pub blocked_reason: &'static str,
    is_complete: fn(&BookingRecord) -> bool,
}

impl StepDescriptor {
    pub fn is_complete(&self, record: &BookingRecord) -> bool {
        (self.is_complete)(record)
    }
}

fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

fn bus_color_chosen(record: &BookingRecord) -> bool {
    record.bus_color.is_some()
}

fn bus_number_entered(record: &BookingRecord) -> bool {
    has_text(&record.bus_number)
}

fn bus_route_entered(record: &BookingRecord) -> bool {
    has_text(&record.bus_route)
}

fn starting_stop_entered(record: &BookingRecord) -> bool {
    has_text(&record.starting_stop)
}

fn ending_stop_entered(record: &BookingRecord) -> bool {
    has_text(&record.ending_stop)
}

fn fare_positive(record: &BookingRecord) -> bool {
    record.fare.is_some_and(|fare| fare.is_finite() && fare > 0.0)
}

fn always(_: &BookingRecord) -> bool {
    true
}

pub static STEPS: [StepDescriptor; WizardStep::COUNT as usize] = [
    StepDescriptor {
        title: "Select Bus Type",
        hint: "Choose the colour of the bus you are boarding.",
        placeholder: "",
        field: Some(BookingField::BusColor),
        input: StepInput::ColorChoice,
        blocked_reason: "Pick a bus type to continue",
        is_complete: bus_color_chosen,
    },
    StepDescriptor {
        title: "Enter Bus Number",
        hint: "Enter the bus registration number.",
        placeholder: "e.g. DL1PD6008",
        field: Some(BookingField::BusNumber),
        input: StepInput::Text,
        blocked_reason: "Bus number is required",
        is_complete: bus_number_entered,
    },
    StepDescriptor {
        title: "Enter Bus Route",
        hint: "Enter the route code or name.",
        placeholder: "e.g. 740, OMS(-)",
        field: Some(BookingField::BusRoute),
        input: StepInput::Text,
        blocked_reason: "Bus route is required",
        is_complete: bus_route_entered,
    },
    StepDescriptor {
        title: "Starting Stop",
        hint: "Enter your boarding stop name.",
        placeholder: "e.g. D Block Janak Puri",
        field: Some(BookingField::StartingStop),
        input: StepInput::Text,
        blocked_reason: "Starting stop is required",
        is_complete: starting_stop_entered,
    },
    StepDescriptor {
        title: "Ending Stop",
        hint: "Enter your destination stop name.",
        placeholder: "e.g. Uttam Nagar Terminal",
        field: Some(BookingField::EndingStop),
        input: StepInput::Text,
        blocked_reason: "Ending stop is required",
        is_complete: ending_stop_entered,
    },
    StepDescriptor {
        title: "Enter Fare Amount",
        hint: "Enter the original fare per ticket in rupees.",
        placeholder: "e.g. 10.00",
        field: Some(BookingField::Fare),
        input: StepInput::Fare,
        blocked_reason: "Fare must be greater than zero",
        is_complete: fare_positive,
    },
    StepDescriptor {
        title: "Number of Tickets",
        hint: "How many passengers are travelling?",
        placeholder: "",
        field: Some(BookingField::TicketCount),
        input: StepInput::TicketCount,
        blocked_reason: "Choose between 1 and 5 tickets",
        is_complete: always,
    },
    StepDescriptor {
        title: "Confirm Booking",
        hint: "Check the details, then generate the ticket.",
        placeholder: "",
        field: None,
        input: StepInput::Summary,
        blocked_reason: "",
        is_complete: always,
    },
];

pub fn descriptor(step: WizardStep) -> &'static StepDescriptor {
    &STEPS[step.index()]
}

/// Why `advance` refused to move. Not an error: the UI keeps "Next"
/// disabled and shows the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepBlocked {
    pub step: WizardStep,
    pub field: Option<BookingField>,
    pub reason: &'static str,
}

impl fmt::Display for StepBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.step, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Moved(WizardStep),
    Finalized,
    Blocked(StepBlocked),
    AlreadyFinalized,
}

/// Checks `step`'s completeness predicate against `record`.
pub fn check_step(step: WizardStep, record: &BookingRecord) -> Result<(), StepBlocked> {
    let row = descriptor(step);
    if row.is_complete(record) {
        Ok(())
    } else {
        Err(StepBlocked {
            step,
            field: row.field,
            reason: row.blocked_reason,
        })
    }
}

/// Drives a [`BookingState`] through the step table and finalizes it.
///
/// The random source is a type parameter so tests can pass a seeded
/// generator; the application uses `thread_rng()`.
///
/// # Examples
///
/// ```
/// use busticket::application::{AdvanceOutcome, MockConfig, WizardController};
/// use busticket::domain::BookingField;
///
/// let mut wizard = WizardController::new(MockConfig::default());
/// assert!(matches!(wizard.advance().unwrap(), AdvanceOutcome::Blocked(_)));
///
/// wizard.set_field(BookingField::BusColor, "Red").unwrap();
/// assert!(matches!(wizard.advance().unwrap(), AdvanceOutcome::Moved(_)));
/// ```
pub struct WizardController<R = ThreadRng> {
    state: BookingState,
    config: MockConfig,
    generator: IdentifierGenerator,
    rng: R,
}

impl WizardController<ThreadRng> {
    pub fn new(config: MockConfig) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl Default for WizardController<ThreadRng> {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl<R> fmt::Debug for WizardController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<R: Rng> WizardController<R> {
    pub fn with_rng(config: MockConfig, rng: R) -> Self {
        let generator = IdentifierGenerator::new(config.mock_date.clone());
        Self {
            state: BookingState::default(),
            config,
            generator,
            rng,
        }
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn record(&self) -> &BookingRecord {
        self.state.record()
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    pub fn phase(&self) -> WizardPhase {
        self.state.phase()
    }

    pub fn ticket(&self) -> Option<Ticket<'_>> {
        self.state.ticket()
    }

    /// The current step's table row, or `None` once finalized.
    pub fn current_step(&self) -> Option<&'static StepDescriptor> {
        match self.phase() {
            WizardPhase::Step(step) => Some(descriptor(step)),
            WizardPhase::Finalized => None,
        }
    }

    /// Whether `advance` would currently leave the step.
    pub fn can_advance(&self) -> bool {
        match self.phase() {
            WizardPhase::Step(step) => check_step(step, self.record()).is_ok(),
            WizardPhase::Finalized => false,
        }
    }

    pub fn set_field(&mut self, field: BookingField, value: &str) -> DomainResult<()> {
        self.state.set_field(field, value)
    }

    pub fn set_field_by_name(&mut self, name: &str, value: &str) -> DomainResult<()> {
        self.state.set_field_by_name(name, value)
    }

    /// Moves to the next step, or finalizes from the last one.
    ///
    /// A failing step predicate is reported as [`AdvanceOutcome::Blocked`].
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidInput`] if the fare was changed to an unusable
    /// value after step 6 and finalization cannot price the ticket. The
    /// wizard stays on the last step in that case.
    pub fn advance(&mut self) -> DomainResult<AdvanceOutcome> {
        let step = match self.phase() {
            WizardPhase::Step(step) => step,
            WizardPhase::Finalized => return Ok(AdvanceOutcome::AlreadyFinalized),
        };

        if let Err(blocked) = check_step(step, self.record()) {
            debug!(step = step.number(), reason = blocked.reason, "advance blocked");
            return Ok(AdvanceOutcome::Blocked(blocked));
        }

        match step.next() {
            Some(next) => {
                self.state.set_step(next);
                debug!(from = step.number(), to = next.number(), "advanced");
                Ok(AdvanceOutcome::Moved(next))
            }
            None => {
                self.finalize()?;
                Ok(AdvanceOutcome::Finalized)
            }
        }
    }

    /// Goes back one step. Always allowed except on step 1 and after
    /// finalization.
    pub fn retreat(&mut self) -> Option<WizardStep> {
        let WizardPhase::Step(step) = self.phase() else {
            return None;
        };
        let previous = step.previous()?;
        self.state.set_step(previous);
        debug!(from = step.number(), to = previous.number(), "retreated");
        Some(previous)
    }

    pub fn reset(&mut self) {
        self.state.reset();
        info!("booking reset");
    }

    fn finalize(&mut self) -> DomainResult<()> {
        let fare = self
            .record()
            .fare
            .ok_or_else(|| DomainError::InvalidInput("fare has not been entered".to_string()))?;
        let discounted = FareCalculator::discount(fare).inspect_err(|e| {
            warn!(error = %e, "cannot finalize booking");
        })?;

        let identifiers = self.generator.generate(&mut self.rng);
        info!(
            transaction_id = %identifiers.transaction_id,
            discounted_fare = discounted,
            tickets = self.record().ticket_count.get(),
            "booking finalized"
        );
        self.state.finalize(
            discounted,
            self.config.mock_booking_time_display.clone(),
            identifiers,
        );
        Ok(())
    }
}
