//! Barcode scan collaborator.
//!
//! A scan session yields a raw payload of the form `name:calories:protein`,
//! or nothing if the user cancels. There is no real barcode decoding here;
//! [`StubScanner`] hands back a fixed payload.

use tracing::debug;

/// Payload returned by [`StubScanner::default`].
pub const DEFAULT_STUB_PAYLOAD: &str = "Sample Food:100:10";

/// Field separator in scan payloads.
const SEPARATOR: char = ':';

/// A well-formed scan result, ready to be added to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFood {
    pub name: String,
    pub calories: u32,
    pub protein: u32,
}

/// Parses a raw `name:calories:protein` payload.
///
/// Returns `None` for a wrong field count, an empty name, or a calorie or
/// protein field that is not an unsigned integer.
pub fn parse_payload(raw: &str) -> Option<ScannedFood> {
    let fields: Vec<&str> = raw.split(SEPARATOR).map(str::trim).collect();
    let [name, calories, protein] = fields.as_slice() else {
        return None;
    };

    if name.is_empty() {
        return None;
    }

    Some(ScannedFood {
        name: (*name).to_string(),
        calories: calories.parse().ok()?,
        protein: protein.parse().ok()?,
    })
}

/// Something that can run one barcode capture session.
pub trait BarcodeScanner {
    /// Runs a session and returns the raw payload, or `None` if cancelled.
    fn scan(&mut self) -> Option<String>;
}

/// Scanner that always returns the same payload.
#[derive(Debug, Clone)]
pub struct StubScanner {
    payload: Option<String>,
}

impl StubScanner {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
        }
    }

    /// A scanner whose sessions are always cancelled.
    pub fn cancelled() -> Self {
        Self { payload: None }
    }
}

impl Default for StubScanner {
    fn default() -> Self {
        Self::new(DEFAULT_STUB_PAYLOAD)
    }
}

impl BarcodeScanner for StubScanner {
    fn scan(&mut self) -> Option<String> {
        self.payload.clone()
    }
}

/// Runs one scan session and parses its payload.
pub fn scan_food<B: BarcodeScanner + ?Sized>(scanner: &mut B) -> Option<ScannedFood> {
    let Some(raw) = scanner.scan() else {
        debug!("Scan cancelled");
        return None;
    };

    let food = parse_payload(&raw);
    if food.is_none() {
        debug!("Discarding malformed scan payload {:?}", raw);
    }
    food
}
