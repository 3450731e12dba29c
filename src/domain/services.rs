//! Identifier generation and fare arithmetic for the booking wizard.
//!
//! Both generators take the random source as an argument so that a seeded
//! generator yields repeatable identifiers in tests while the application
//! draws from `thread_rng()`. Nothing produced here is cryptographically
//! meaningful: the QR payload only looks like an encrypted token and the
//! transaction ID only looks like a gateway reference.

use rand::Rng;

use super::errors::{DomainError, DomainResult};
use super::models::{MockDate, SessionIdentifiers};

pub const QR_PREFIX: &str = "gAAAAA";
pub const QR_SUFFIX: &str = "==";
pub const QR_BODY_LEN: usize = 160;
pub const QR_PAYLOAD_LEN: usize = QR_PREFIX.len() + QR_BODY_LEN + QR_SUFFIX.len();

pub const TRANSACTION_SUFFIX_LEN: usize = 12;
pub const TRANSACTION_ID_LEN: usize = 1 + 8 + TRANSACTION_SUFFIX_LEN;

const QR_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const UPPER_ALPHANUMERIC: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LOWERCASE: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

fn pick<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8]) -> char {
    char::from(alphabet[rng.gen_range(0..alphabet.len())])
}

/// Mints the transaction ID and QR payload for a finalized booking.
///
/// # Examples
///
/// ```
/// use busticket::domain::{IdentifierGenerator, MockDate};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let generator = IdentifierGenerator::new(MockDate::default());
/// let mut rng = StdRng::seed_from_u64(7);
///
/// let id = generator.generate_transaction_id(&mut rng);
/// assert!(id.starts_with("T27072025"));
/// assert_eq!(id.len(), 21);
///
/// let payload = generator.generate_qr_payload(&mut rng);
/// assert_eq!(payload.len(), 168);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentifierGenerator {
    mock_date: MockDate,
}

impl IdentifierGenerator {
    pub fn new(mock_date: MockDate) -> Self {
        Self { mock_date }
    }

    pub fn mock_date(&self) -> &MockDate {
        &self.mock_date
    }

    /// Builds `gAAAAA` + 160 characters of `[A-Za-z0-9-_]` + `==`.
    pub fn generate_qr_payload<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut payload = String::with_capacity(QR_PAYLOAD_LEN);
        payload.push_str(QR_PREFIX);
        for _ in 0..QR_BODY_LEN {
            payload.push(pick(rng, QR_ALPHABET));
        }
        payload.push_str(QR_SUFFIX);
        payload
    }

    /// Builds `T` + mock date + 12 characters of `[A-Z0-9]` with one or two
    /// positions overwritten by a lowercase letter.
    ///
    /// The two overwrite positions are drawn independently, so when two are
    /// requested they can land on the same index and leave only one
    /// lowercase letter behind.
    pub fn generate_transaction_id<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut suffix: Vec<char> = (0..TRANSACTION_SUFFIX_LEN)
            .map(|_| pick(rng, UPPER_ALPHANUMERIC))
            .collect();

        let substitutions = if rng.gen_bool(0.5) { 1 } else { 2 };
        for _ in 0..substitutions {
            let position = rng.gen_range(0..TRANSACTION_SUFFIX_LEN);
            suffix[position] = pick(rng, LOWERCASE);
        }

        let mut id = String::with_capacity(TRANSACTION_ID_LEN);
        id.push('T');
        id.push_str(self.mock_date.as_str());
        id.extend(suffix);
        id
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionIdentifiers {
        let transaction_id = self.generate_transaction_id(rng);
        let qr_payload = self.generate_qr_payload(rng);
        SessionIdentifiers {
            transaction_id,
            qr_payload,
        }
    }
}

/// 10% off, i.e. the customer pays 90% of the listed fare.
pub const DISCOUNT_MULTIPLIER: f64 = 0.9;

pub struct FareCalculator;

impl FareCalculator {
    /// Applies the discount and rounds to paise (two decimals, half away
    /// from zero).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInput`] when `fare` is zero, negative,
    /// NaN or infinite.
    ///
    /// # Examples
    ///
    /// ```
    /// use busticket::domain::FareCalculator;
    ///
    /// assert_eq!(FareCalculator::discount(10.0).unwrap(), 9.0);
    /// assert!(FareCalculator::discount(0.0).is_err());
    /// ```
    pub fn discount(fare: f64) -> DomainResult<f64> {
        if !fare.is_finite() || fare <= 0.0 {
            return Err(DomainError::invalid(format!(
                "fare must be a positive amount, got {fare}"
            )));
        }
        Ok(round_to_cents(fare * DISCOUNT_MULTIPLIER))
    }

    pub fn format_amount(amount: f64) -> String {
        format!("{amount:.2}")
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    fn generator() -> IdentifierGenerator {
        IdentifierGenerator::new(MockDate::default())
    }

    fn lowercase_count(id: &str) -> usize {
        id[9..].chars().filter(|c| c.is_ascii_lowercase()).count()
    }

    #[test]
    fn test_qr_payload_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let payload = generator().generate_qr_payload(&mut rng);

        assert_eq!(payload.len(), QR_PAYLOAD_LEN);
        assert_eq!(QR_PAYLOAD_LEN, 168);
        assert!(payload.starts_with("gAAAAA"));
        assert!(payload.ends_with("=="));
        assert!(
            payload[6..166]
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        );
    }

    #[test]
    fn test_transaction_id_shape() {
        let mut rng = StdRng::seed_from_u64(2);
        let id = generator().generate_transaction_id(&mut rng);

        assert_eq!(id.len(), TRANSACTION_ID_LEN);
        assert_eq!(TRANSACTION_ID_LEN, 21);
        assert!(id.starts_with("T27072025"));
        assert!(id[9..].chars().all(|c| c.is_ascii_alphanumeric()));
        let lower = lowercase_count(&id);
        assert!((1..=2).contains(&lower), "got {lower} lowercase in {id}");
    }

    #[test]
    fn test_transaction_id_uses_configured_date() {
        let generator = IdentifierGenerator::new(MockDate::parse("01122030").unwrap());
        let mut rng = StdRng::seed_from_u64(3);
        let id = generator.generate_transaction_id(&mut rng);
        assert_eq!(&id[1..9], "01122030");
    }

    #[test]
    fn test_same_seed_same_identifiers() {
        let a = generator().generate(&mut StdRng::seed_from_u64(42));
        let b = generator().generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);

        let c = generator().generate(&mut StdRng::seed_from_u64(43));
        assert_ne!(a, c);
    }

    #[test]
    fn test_both_substitution_counts_occur() {
        let mut seen = [false; 3];
        for seed in 0..500 {
            let id = generator().generate_transaction_id(&mut StdRng::seed_from_u64(seed));
            seen[lowercase_count(&id)] = true;
        }
        assert!(!seen[0]);
        assert!(seen[1]);
        assert!(seen[2]);
    }

    #[test]
    fn test_colliding_substitutions_leave_single_lowercase() {
        // Every draw yields 2^63: gen_bool(0.5) comes out false (two
        // substitutions) and every gen_range lands on the middle of its
        // range, so both overwrites hit suffix position 6.
        let mut rng = StepRng::new(1 << 63, 0);
        let id = generator().generate_transaction_id(&mut rng);
        let suffix: Vec<char> = id[9..].chars().collect();

        assert_eq!(id.len(), TRANSACTION_ID_LEN);
        assert_eq!(lowercase_count(&id), 1);
        assert!(suffix[6].is_ascii_lowercase());
        assert!(
            suffix
                .iter()
                .enumerate()
                .all(|(i, c)| i == 6 || c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_discount_known_values() {
        assert_eq!(FareCalculator::discount(10.0).unwrap(), 9.0);
        assert_eq!(FareCalculator::discount(15.0).unwrap(), 13.5);
        assert_eq!(FareCalculator::discount(25.0).unwrap(), 22.5);
        assert_eq!(FareCalculator::discount(12.5).unwrap(), 11.25);
        assert_eq!(FareCalculator::discount(7.0).unwrap(), 6.3);
    }

    #[test]
    fn test_discount_rejects_invalid_fares() {
        for fare in [0.0, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(
                matches!(FareCalculator::discount(fare), Err(DomainError::InvalidInput(_))),
                "fare {fare} should be rejected"
            );
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(FareCalculator::format_amount(9.0), "9.00");
        assert_eq!(FareCalculator::format_amount(11.25), "11.25");
        assert_eq!(FareCalculator::format_amount(6.3), "6.30");
    }

    proptest! {
        #[test]
        fn prop_discount_is_rounded_ninety_percent(fare in 1.0f64..100_000.0) {
            let discounted = FareCalculator::discount(fare).unwrap();
            prop_assert!(discounted < fare);
            prop_assert!((discounted - fare * 0.9).abs() <= 0.005 + 1e-9);
            prop_assert!(((discounted * 100.0).round() - discounted * 100.0).abs() < 1e-6);
        }

        #[test]
        fn prop_transaction_id_pattern(seed in any::<u64>()) {
            let id = generator().generate_transaction_id(&mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(id.len(), 21);
            prop_assert!(id.starts_with('T'));
            prop_assert!(id[1..9].bytes().all(|b| b.is_ascii_digit()));
            prop_assert!(id[9..].bytes().all(|b| b.is_ascii_alphanumeric()));
            let lower = lowercase_count(&id);
            prop_assert!((1..=2).contains(&lower));
        }

        #[test]
        fn prop_qr_payload_pattern(seed in any::<u64>()) {
            let payload = generator().generate_qr_payload(&mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(payload.len(), 168);
            prop_assert!(payload.starts_with(QR_PREFIX));
            prop_assert!(payload.ends_with(QR_SUFFIX));
            prop_assert!(payload[6..166].bytes().all(|b| QR_ALPHABET.contains(&b)));
        }
    }
}
