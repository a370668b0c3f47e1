//! CPF (Cadastro de Pessoas Físicas) validation.
//!
//! A CPF is 11 decimal digits: 9 base digits followed by 2 verification
//! digits computed from them. Input may carry the usual punctuation
//! (`123.456.789-09`); everything that is not a digit is stripped before
//! checking.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of digits in a normalized CPF.
pub const CPF_LEN: usize = 11;

/// Number of base digits the verification digits are derived from.
const BASE_LEN: usize = 9;

/// Reasons a string is not a valid CPF.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CpfError {
    #[error("Invalid CPF format: {0}")]
    InvalidFormat(String),

    #[error("CPF verification digits do not match")]
    ChecksumMismatch,
}

/// A CPF that passed format and checksum validation.
///
/// Holds the 11 normalized digits. The only way to build one is through
/// [`Cpf::parse`], so holding a `Cpf` means the checksum was verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Validate and normalize a CPF.
    pub fn parse(input: &str) -> Result<Self, CpfError> {
        validate(input)
    }

    /// The 11 digits without punctuation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The conventional `XXX.XXX.XXX-XX` rendering.
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cpf {
    type Error = CpfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

/// Strip every non-digit character.
pub fn normalize(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Compute the two verification digits for 9 base digits.
///
/// `base` must hold exactly 9 values in `0..=9`.
pub fn check_digits(base: &[u8; BASE_LEN]) -> (u8, u8) {
    let first = verification_digit(base.iter().copied(), 10);
    let second = verification_digit(base.iter().copied().chain(std::iter::once(first)), 11);
    (first, second)
}

/// Weighted sum with weights descending from `top_weight` to 2, then the
/// mod-11 rule: remainder below 2 gives 0, otherwise `11 - remainder`.
fn verification_digit(digits: impl Iterator<Item = u8>, top_weight: u32) -> u8 {
    let sum: u32 = digits
        .zip((2..=top_weight).rev())
        .map(|(d, w)| u32::from(d) * w)
        .sum();

    match sum % 11 {
        r if r < 2 => 0,
        r => (11 - r) as u8,
    }
}

/// Validate a CPF string.
pub fn validate(input: &str) -> Result<Cpf, CpfError> {
    let digits = normalize(input);

    if digits.len() != CPF_LEN {
        return Err(CpfError::InvalidFormat(format!(
            "expected {} digits, got {}",
            CPF_LEN,
            digits.len()
        )));
    }

    let values: Vec<u8> = digits.bytes().map(|b| b - b'0').collect();

    if values.iter().all(|&d| d == values[0]) {
        return Err(CpfError::InvalidFormat(
            "all digits are identical".to_string(),
        ));
    }

    let mut base = [0u8; BASE_LEN];
    base.copy_from_slice(&values[..BASE_LEN]);

    let (first, second) = check_digits(&base);
    if values[9] != first || values[10] != second {
        return Err(CpfError::ChecksumMismatch);
    }

    Ok(Cpf(digits))
}

/// Convenience wrapper returning only whether the CPF is valid.
pub fn is_valid(input: &str) -> bool {
    validate(input).is_ok()
}
