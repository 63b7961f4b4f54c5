pub mod dto;
pub mod services;

use lazy_static::lazy_static;
use regex::Regex;

pub use dto::{BarcodeResponse, Food, FoodSource, NewFood};

/// EAN-8 through EAN-14 style codes: digits only, 8 to 14 of them.
pub fn is_valid_barcode(code: &str) -> bool {
    lazy_static! {
        static ref BARCODE_RE: Regex = Regex::new(r"^\d{8,14}$").unwrap();
    }
    BARCODE_RE.is_match(code.trim())
}
