use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::errors::{DomainError, DomainResult};

/// Bus livery; only affects the ticket's colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BusColor {
    #[serde(rename = "Red")]
    Red,
    #[serde(rename = "Blue Dark")]
    BlueDark,
    #[serde(rename = "Blue Light")]
    BlueLight,
    #[serde(rename = "Orange")]
    Orange,
}

impl BusColor {
    pub const ALL: [BusColor; 4] = [
        BusColor::Red,
        BusColor::BlueDark,
        BusColor::BlueLight,
        BusColor::Orange,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BusColor::Red => "Red",
            BusColor::BlueDark => "Blue Dark",
            BusColor::BlueLight => "Blue Light",
            BusColor::Orange => "Orange",
        }
    }

    /// Position of this colour in [`BusColor::ALL`].
    pub fn index(self) -> usize {
        match self {
            BusColor::Red => 0,
            BusColor::BlueDark => 1,
            BusColor::BlueLight => 2,
            BusColor::Orange => 3,
        }
    }
}

impl fmt::Display for BusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BusColor {
    type Err = DomainError;

    /// Accepts the display labels ignoring case and whitespace, so
    /// `"Blue Dark"`, `"bluedark"` and `"BLUE  DARK"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "red" => Ok(BusColor::Red),
            "bluedark" => Ok(BusColor::BlueDark),
            "bluelight" => Ok(BusColor::BlueLight),
            "orange" => Ok(BusColor::Orange),
            _ => Err(DomainError::invalid(format!("unknown bus type '{}'", s.trim()))),
        }
    }
}

/// Number of tickets in one booking, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TicketCount(u8);

impl TicketCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(count: u8) -> DomainResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(DomainError::invalid(format!(
                "ticket count must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                count
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn increment(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl Default for TicketCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for TicketCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed `DDMMYYYY` date stamped into every transaction ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MockDate(String);

impl MockDate {
    pub const DEFAULT: &'static str = "27072025";

    /// Parses an eight-digit `DDMMYYYY` string that names a real calendar date.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid(format!(
                "mock date must be 8 digits (DDMMYYYY), got '{raw}'"
            )));
        }
        NaiveDate::parse_from_str(raw, "%d%m%Y")
            .map_err(|_| DomainError::invalid(format!("'{raw}' is not a valid DDMMYYYY date")))?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MockDate {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for MockDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the eight form-collection steps, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WizardStep(u8);

impl WizardStep {
    pub const COUNT: u8 = 8;
    pub const FIRST: WizardStep = WizardStep(1);
    pub const LAST: WizardStep = WizardStep(Self::COUNT);

    pub fn new(number: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&number).then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position, for indexing step tables.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::new(self.0 - 1)
    }

    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    pub fn all() -> impl Iterator<Item = WizardStep> {
        (1..=Self::COUNT).map(WizardStep)
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the wizard currently is: collecting a step, or done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Step(WizardStep),
    Finalized,
}

/// Names accepted by `set_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingField {
    BusColor,
    BusNumber,
    BusRoute,
    StartingStop,
    EndingStop,
    Fare,
    TicketCount,
}

impl BookingField {
    pub const ALL: [BookingField; 7] = [
        BookingField::BusColor,
        BookingField::BusNumber,
        BookingField::BusRoute,
        BookingField::StartingStop,
        BookingField::EndingStop,
        BookingField::Fare,
        BookingField::TicketCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BookingField::BusColor => "busColor",
            BookingField::BusNumber => "busNumber",
            BookingField::BusRoute => "busRoute",
            BookingField::StartingStop => "startingStop",
            BookingField::EndingStop => "endingStop",
            BookingField::Fare => "fare",
            BookingField::TicketCount => "ticketCount",
        }
    }
}

impl fmt::Display for BookingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BookingField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| DomainError::invalid(format!("unknown booking field '{s}'")))
    }
}

/// The form data collected by the wizard.
///
/// `discounted_fare` and `booking_time` stay `None` until the booking is
/// finalized; they are never touched by [`BookingRecord::set`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub bus_color: Option<BusColor>,
    pub bus_number: String,
    pub bus_route: String,
    pub starting_stop: String,
    pub ending_stop: String,
    pub fare: Option<f64>,
    pub ticket_count: TicketCount,
    pub discounted_fare: Option<f64>,
    pub booking_time: Option<String>,
}

impl BookingRecord {
    /// Updates one field from its raw text form.
    ///
    /// On error the field keeps its previous value.
    pub fn set(&mut self, field: BookingField, raw: &str) -> DomainResult<()> {
        match field {
            BookingField::BusColor => {
                self.bus_color = if raw.trim().is_empty() {
                    None
                } else {
                    Some(raw.parse()?)
                };
            }
            BookingField::BusNumber => self.bus_number = raw.to_uppercase(),
            BookingField::BusRoute => self.bus_route = raw.to_string(),
            BookingField::StartingStop => self.starting_stop = raw.to_string(),
            BookingField::EndingStop => self.ending_stop = raw.to_string(),
            BookingField::Fare => {
                let trimmed = raw.trim();
                self.fare = if trimmed.is_empty() {
                    None
                } else {
                    let fare = trimmed
                        .parse::<f64>()
                        .map_err(|_| DomainError::invalid(format!("fare '{trimmed}' is not a number")))?;
                    Some(fare)
                };
            }
            BookingField::TicketCount => {
                let trimmed = raw.trim();
                let count = trimmed
                    .parse::<u8>()
                    .map_err(|_| DomainError::invalid(format!("ticket count '{trimmed}' is not a whole number")))?;
                self.ticket_count = TicketCount::new(count)?;
            }
        }
        Ok(())
    }

    /// The current value of a field in the text form `set` accepts.
    pub fn text(&self, field: BookingField) -> String {
        match field {
            BookingField::BusColor => self
                .bus_color
                .map(|c| c.label().to_string())
                .unwrap_or_default(),
            BookingField::BusNumber => self.bus_number.clone(),
            BookingField::BusRoute => self.bus_route.clone(),
            BookingField::StartingStop => self.starting_stop.clone(),
            BookingField::EndingStop => self.ending_stop.clone(),
            BookingField::Fare => self.fare.map(|f| f.to_string()).unwrap_or_default(),
            BookingField::TicketCount => self.ticket_count.to_string(),
        }
    }
}

/// Identifiers minted once per finalized booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentifiers {
    pub transaction_id: String,
    pub qr_payload: String,
}

/// Read-only view of a finalized booking.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Ticket<'a> {
    #[serde(flatten)]
    pub booking: &'a BookingRecord,
    #[serde(flatten)]
    pub identifiers: &'a SessionIdentifiers,
}

impl Ticket<'_> {
    pub fn transaction_id(&self) -> &str {
        &self.identifiers.transaction_id
    }

    pub fn qr_payload(&self) -> &str {
        &self.identifiers.qr_payload
    }

    pub fn fare(&self) -> f64 {
        self.booking.fare.unwrap_or_default()
    }

    pub fn discounted_fare(&self) -> f64 {
        self.booking.discounted_fare.unwrap_or_default()
    }

    pub fn booking_time(&self) -> &str {
        self.booking.booking_time.as_deref().unwrap_or_default()
    }
}
