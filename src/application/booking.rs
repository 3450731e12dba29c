//! The single in-progress booking: form data, current step and, once the
//! wizard has finished, the minted identifiers.

use crate::domain::{
    BookingField, BookingRecord, DomainError, DomainResult, SessionIdentifiers, Ticket, WizardPhase,
    WizardStep,
};

/// Holds the booking record and where the wizard is.
///
/// Field edits go through [`BookingState::set_field`]; step movement and
/// finalization are driven by the wizard controller.
///
/// # Examples
///
/// ```
/// use busticket::application::BookingState;
/// use busticket::domain::{BookingField, WizardPhase, WizardStep};
///
/// let mut state = BookingState::default();
/// state.set_field(BookingField::BusRoute, "740").unwrap();
/// assert_eq!(state.record().bus_route, "740");
/// assert_eq!(state.phase(), WizardPhase::Step(WizardStep::FIRST));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BookingState {
    record: BookingRecord,
    step: WizardStep,
    identifiers: Option<SessionIdentifiers>,
}

impl BookingState {
    pub fn record(&self) -> &BookingRecord {
        &self.record
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn identifiers(&self) -> Option<&SessionIdentifiers> {
        self.identifiers.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.identifiers.is_some()
    }

    pub fn phase(&self) -> WizardPhase {
        if self.is_finalized() {
            WizardPhase::Finalized
        } else {
            WizardPhase::Step(self.step)
        }
    }

    /// The finished ticket, if the booking has been finalized.
    pub fn ticket(&self) -> Option<Ticket<'_>> {
        self.identifiers.as_ref().map(|identifiers| Ticket {
            booking: &self.record,
            identifiers,
        })
    }

    /// Updates exactly one field. No cross-field checks happen here.
    ///
    /// # Errors
    ///
    /// [`DomainError::BookingFinalized`] after finalization, or
    /// [`DomainError::InvalidInput`] if `value` does not parse for `field`.
    pub fn set_field(&mut self, field: BookingField, value: &str) -> DomainResult<()> {
        if self.is_finalized() {
            return Err(DomainError::BookingFinalized);
        }
        self.record.set(field, value)
    }

    /// Same as [`BookingState::set_field`] but addressed by the camelCase
    /// field name, e.g. `"startingStop"`.
    pub fn set_field_by_name(&mut self, name: &str, value: &str) -> DomainResult<()> {
        let field = name.parse::<BookingField>()?;
        self.set_field(field, value)
    }

    /// Discards everything and starts over at step 1.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn set_step(&mut self, step: WizardStep) {
        self.step = step;
    }

    pub(crate) fn finalize(
        &mut self,
        discounted_fare: f64,
        booking_time: String,
        identifiers: SessionIdentifiers,
    ) {
        self.record.discounted_fare = Some(discounted_fare);
        self.record.booking_time = Some(booking_time);
        self.identifiers = Some(identifiers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BusColor;

    fn identifiers() -> SessionIdentifiers {
        SessionIdentifiers {
            transaction_id: "T27072025ABCDEFGHIJkL".to_string(),
            qr_payload: "gAAAAA==".to_string(),
        }
    }

    #[test]
    fn test_default_state() {
        let state = BookingState::default();
        assert_eq!(state.step(), WizardStep::FIRST);
        assert!(!state.is_finalized());
        assert!(state.ticket().is_none());
        assert_eq!(state.record(), &BookingRecord::default());
    }

    #[test]
    fn test_set_field_by_name() {
        let mut state = BookingState::default();
        state.set_field_by_name("busColor", "Red").unwrap();
        state.set_field_by_name("startingStop", "D Block Janak Puri").unwrap();
        assert_eq!(state.record().bus_color, Some(BusColor::Red));
        assert_eq!(state.record().starting_stop, "D Block Janak Puri");

        assert!(matches!(
            state.set_field_by_name("colour", "Red"),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_finalized_record_is_immutable() {
        let mut state = BookingState::default();
        state.set_field(BookingField::BusNumber, "dl1pd6008").unwrap();
        state.finalize(9.0, "27 Jul 25 | 12:28 PM".to_string(), identifiers());

        assert_eq!(state.phase(), WizardPhase::Finalized);
        assert_eq!(
            state.set_field(BookingField::BusNumber, "OTHER"),
            Err(DomainError::BookingFinalized)
        );
        assert_eq!(state.record().bus_number, "DL1PD6008");

        let ticket = state.ticket().unwrap();
        assert_eq!(ticket.discounted_fare(), 9.0);
        assert_eq!(ticket.booking_time(), "27 Jul 25 | 12:28 PM");
        assert_eq!(ticket.transaction_id(), "T27072025ABCDEFGHIJkL");
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut state = BookingState::default();
        state.set_field(BookingField::TicketCount, "3").unwrap();
        state.set_step(WizardStep::LAST);
        state.finalize(9.0, "t".to_string(), identifiers());

        state.reset();

        assert_eq!(state.step(), WizardStep::FIRST);
        assert!(state.identifiers().is_none());
        assert_eq!(state.record().ticket_count.get(), 1);
        assert!(state.record().discounted_fare.is_none());
        assert!(state.record().booking_time.is_none());
    }
}
