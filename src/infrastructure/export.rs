use crate::domain::Ticket;

use super::errors::InfrastructureError;

pub struct TicketExporter;

impl TicketExporter {
    /// Pretty-printed JSON with camelCase keys, as copied by the ticket view.
    pub fn to_json(ticket: &Ticket<'_>) -> Result<String, InfrastructureError> {
        Ok(serde_json::to_string_pretty(ticket)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingField, BookingRecord, SessionIdentifiers};

    #[test]
    fn test_ticket_json_keys() {
        let mut record = BookingRecord::default();
        record.set(BookingField::BusColor, "Blue Dark").unwrap();
        record.set(BookingField::BusNumber, "dl1pd6008").unwrap();
        record.set(BookingField::Fare, "10").unwrap();
        record.set(BookingField::TicketCount, "2").unwrap();
        record.discounted_fare = Some(9.0);
        record.booking_time = Some("27 Jul 25 | 12:28 PM".to_string());
        let identifiers = SessionIdentifiers {
            transaction_id: "T27072025A1B2C3D4E5fG".to_string(),
            qr_payload: "gAAAAAabc==".to_string(),
        };
        let ticket = Ticket {
            booking: &record,
            identifiers: &identifiers,
        };

        let json = TicketExporter::to_json(&ticket).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["busColor"], "Blue Dark");
        assert_eq!(value["busNumber"], "DL1PD6008");
        assert_eq!(value["fare"], 10.0);
        assert_eq!(value["discountedFare"], 9.0);
        assert_eq!(value["ticketCount"], 2);
        assert_eq!(value["bookingTime"], "27 Jul 25 | 12:28 PM");
        assert_eq!(value["transactionId"], "T27072025A1B2C3D4E5fG");
        assert_eq!(value["qrPayload"], "gAAAAAabc==");
    }
}
