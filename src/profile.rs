//! User Profiles
//!
//! Off-chain identity documents: {name, PAN, Aadhaar, mobile} pinned to
//! IPFS as JSON, referenced on-chain only by CID. Identity numbers are
//! masked before the document ever leaves the process — the pinned copy
//! never contains the full values.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Validation failures on profile input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Invalid PAN: expected 5 letters, 4 digits, 1 letter")]
    InvalidPan,

    #[error("Invalid Aadhaar: expected 12 digits")]
    InvalidAadhaar,

    #[error("Invalid mobile number: expected 10 digits")]
    InvalidMobile,
}

/// Profile input as submitted by the user, unmasked
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub pan: String,
    pub aadhaar: String,
    pub mobile: String,
}

/// The document actually pinned: identity numbers masked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub name: String,
    pub pan: String,
    pub aadhaar: String,
    pub mobile: String,
}

fn pan_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap())
}

fn aadhaar_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{12}$").unwrap())
}

fn mobile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").unwrap())
}

impl ProfileInput {
    /// Validate the raw input against the Indian identity formats
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if !pan_re().is_match(&self.pan.to_uppercase()) {
            return Err(ProfileError::InvalidPan);
        }
        if !aadhaar_re().is_match(&self.aadhaar) {
            return Err(ProfileError::InvalidAadhaar);
        }
        if !mobile_re().is_match(&self.mobile) {
            return Err(ProfileError::InvalidMobile);
        }
        Ok(())
    }

    /// Validate, then produce the maskable document for pinning
    pub fn into_document(self) -> Result<ProfileDocument, ProfileError> {
        self.validate()?;
        Ok(ProfileDocument {
            name: self.name.trim().to_string(),
            pan: mask_pan(&self.pan.to_uppercase()),
            aadhaar: mask_aadhaar(&self.aadhaar),
            mobile: self.mobile,
        })
    }
}

/// Keep the first and last character, star everything between
pub fn mask_pan(pan: &str) -> String {
    let chars: Vec<char> = pan.chars().collect();
    if chars.len() < 3 {
        return "*".repeat(chars.len());
    }
    let mut masked = String::with_capacity(chars.len());
    masked.push(chars[0]);
    masked.extend(std::iter::repeat('*').take(chars.len() - 2));
    masked.push(chars[chars.len() - 1]);
    masked
}

/// Keep the last 4 digits, star the rest
pub fn mask_aadhaar(aadhaar: &str) -> String {
    let len = aadhaar.chars().count();
    if len <= 4 {
        return aadhaar.to_string();
    }
    let visible: String = aadhaar.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> ProfileInput {
        ProfileInput {
            name: "Asha Rao".to_string(),
            pan: "ABCDE1234F".to_string(),
            aadhaar: "123412341234".to_string(),
            mobile: "9876543210".to_string(),
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn pan_format_enforced() {
        let mut input = valid_input();
        input.pan = "1234ABCDEF".to_string();
        assert_eq!(input.validate(), Err(ProfileError::InvalidPan));
    }

    #[test]
    fn lowercase_pan_accepted() {
        let mut input = valid_input();
        input.pan = "abcde1234f".to_string();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn aadhaar_and_mobile_lengths_enforced() {
        let mut input = valid_input();
        input.aadhaar = "12341234".to_string();
        assert_eq!(input.validate(), Err(ProfileError::InvalidAadhaar));

        let mut input = valid_input();
        input.mobile = "98765".to_string();
        assert_eq!(input.validate(), Err(ProfileError::InvalidMobile));
    }

    #[test]
    fn document_is_masked() {
        let doc = valid_input().into_document().unwrap();
        assert_eq!(doc.pan, "A********F");
        assert_eq!(doc.aadhaar, "********1234");
        // Name and mobile stay readable; mobile is needed for contact
        assert_eq!(doc.name, "Asha Rao");
        assert_eq!(doc.mobile, "9876543210");
    }

    #[test]
    fn masking_never_leaks_middle_characters() {
        let masked = mask_pan("ABCDE1234F");
        assert!(!masked.contains("BCDE"));
        assert!(!masked.contains("1234"));

        let masked = mask_aadhaar("123412341234");
        assert!(!masked.starts_with('1') || masked.starts_with('*'));
    }
}
