// Record and partial-update types plus write-time field checks.
use serde::Serialize;

use crate::core::error::{Error, ErrorKind};

pub const FIELD_NAMES: [&str; 4] = ["id", "name", "phone", "address"];

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Checks that the record can be written without corrupting the
    /// four-lines-per-record layout.
    pub fn validate(&self) -> Result<(), Error> {
        validate_id(&self.id)?;
        validate_field("name", &self.name)?;
        validate_field("phone", &self.phone)?;
        validate_field("address", &self.address)?;
        Ok(())
    }

    /// Phones are stored trimmed, the same way they read back.
    pub fn normalized(mut self) -> Self {
        if self.phone.trim().len() != self.phone.len() {
            self.phone = self.phone.trim().to_string();
        }
        self
    }

    pub fn apply(&mut self, update: &RecordUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(address) = &update.address {
            self.address = address.clone();
        }
    }
}

/// Replacement fields for an update. `None` keeps the stored value; the id
/// is never rewritten.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecordUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = &self.name {
            validate_field("name", name)?;
        }
        if let Some(phone) = &self.phone {
            validate_field("phone", phone)?;
        }
        if let Some(address) = &self.address {
            validate_field("address", address)?;
        }
        Ok(())
    }
}

pub fn validate_id(id: &str) -> Result<(), Error> {
    if id.trim().is_empty() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("id must not be empty")
            .with_hint("Provide a roll number such as `R-101`."));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("id must not contain whitespace")
            .with_id(id)
            .with_hint("Use a single token for the roll number, e.g. `R-101`."));
    }
    Ok(())
}

fn validate_field(field: &str, value: &str) -> Result<(), Error> {
    if value.contains(['\n', '\r']) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("{field} must not contain line breaks"))
            .with_hint("Each field is stored on its own line; keep values on one line."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordUpdate, validate_id};
    use crate::core::error::ErrorKind;

    #[test]
    fn apply_only_touches_present_fields() {
        let mut record = Record::new("R-1", "Asha", "555-0100", "Block A");
        record.apply(&RecordUpdate::new().with_phone("555-0199"));
        assert_eq!(record, Record::new("R-1", "Asha", "555-0199", "Block A"));

        record.apply(&RecordUpdate::new());
        assert_eq!(record.phone, "555-0199");

        record.apply(&RecordUpdate::new().with_phone("  555-0200 "));
        assert_eq!(record.phone, "555-0200");
    }

    #[test]
    fn normalized_trims_only_the_phone() {
        let record = Record::new("R-1", " Asha ", " 555 0100 ", " Block A ").normalized();
        assert_eq!(record, Record::new("R-1", " Asha ", "555 0100", " Block A "));
    }

    #[test]
    fn ids_must_be_single_tokens() {
        assert!(validate_id("R-1").is_ok());
        for bad in ["", "   ", "R 1", "R-1\n"] {
            let err = validate_id(bad).expect_err("invalid id");
            assert_eq!(err.kind(), ErrorKind::Usage);
        }
    }

    #[test]
    fn line_breaks_are_rejected_in_any_field() {
        let record = Record::new("R-1", "Asha\nKhan", "555", "Block A");
        assert_eq!(record.validate().unwrap_err().kind(), ErrorKind::Usage);

        let update = RecordUpdate::new().with_address("Block\r\nB");
        assert_eq!(update.validate().unwrap_err().kind(), ErrorKind::Usage);

        assert!(RecordUpdate::new().with_name("Asha Khan").validate().is_ok());
    }
}
