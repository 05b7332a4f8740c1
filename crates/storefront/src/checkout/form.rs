//! Checkout form validation.

use core::fmt;

use souq_core::{Phone, PhoneError};
use thiserror::Error;

/// Notes sent when the customer leaves delivery notes blank.
pub const EMPTY_NOTES: &str = "none";

/// Contact and delivery details as typed by the customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone: String,
    /// Optional; blank means absent.
    pub second_phone: String,
    pub address: String,
    pub notes: String,
}

/// A form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FullName,
    Phone,
    SecondPhone,
    Address,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FullName => "full name",
            Self::Phone => "phone number",
            Self::SecondPhone => "second phone number",
            Self::Address => "address",
        })
    }
}

/// A single field failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(FormField),
    #[error("{field}: {source}")]
    InvalidPhone {
        field: FormField,
        #[source]
        source: PhoneError,
    },
}

impl FieldError {
    /// The field this error belongs to.
    #[must_use]
    pub const fn field(&self) -> FormField {
        match self {
            Self::Required(field) | Self::InvalidPhone { field, .. } => *field,
        }
    }
}

/// Every field failure found in one pass over the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_field_errors(.0))]
pub struct FormValidationError(Vec<FieldError>);

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormValidationError {
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    /// The individual failures, in form order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The failure for `field`, if any.
    #[must_use]
    pub fn for_field(&self, field: FormField) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field() == field)
    }
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub full_name: String,
    pub phone: Phone,
    pub second_phone: Option<Phone>,
    pub address: String,
    /// Never empty; blank input becomes [`EMPTY_NOTES`].
    pub notes: String,
}

impl CheckoutForm {
    /// Validate every field, reporting all failures at once.
    ///
    /// # Errors
    ///
    /// Returns [`FormValidationError`] listing each invalid field.
    pub fn validate(&self) -> Result<ValidatedForm, FormValidationError> {
        let mut errors = Vec::new();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.push(FieldError::Required(FormField::FullName));
        }

        let phone = match Phone::parse(&self.phone) {
            Ok(phone) => Some(phone),
            Err(PhoneError::Empty) => {
                errors.push(FieldError::Required(FormField::Phone));
                None
            }
            Err(source) => {
                errors.push(FieldError::InvalidPhone {
                    field: FormField::Phone,
                    source,
                });
                None
            }
        };

        let second_phone = if self.second_phone.trim().is_empty() {
            None
        } else {
            match Phone::parse(&self.second_phone) {
                Ok(phone) => Some(phone),
                Err(source) => {
                    errors.push(FieldError::InvalidPhone {
                        field: FormField::SecondPhone,
                        source,
                    });
                    None
                }
            }
        };

        let address = self.address.trim();
        if address.is_empty() {
            errors.push(FieldError::Required(FormField::Address));
        }

        let notes = match self.notes.trim() {
            "" => EMPTY_NOTES.to_string(),
            notes => notes.to_string(),
        };

        match phone {
            Some(phone) if errors.is_empty() => Ok(ValidatedForm {
                full_name: full_name.to_string(),
                phone,
                second_phone,
                address: address.to_string(),
                notes,
            }),
            _ => Err(FormValidationError(errors)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> CheckoutForm {
        CheckoutForm {
            full_name: "  Zainab Ali ".to_string(),
            phone: "07701234567".to_string(),
            second_phone: String::new(),
            address: "Karrada, Baghdad".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let form = filled().validate().unwrap();
        assert_eq!(form.full_name, "Zainab Ali");
        assert_eq!(form.phone.as_str(), "07701234567");
        assert_eq!(form.second_phone, None);
        assert_eq!(form.notes, EMPTY_NOTES);
    }

    #[test]
    fn test_notes_kept_when_present() {
        let form = CheckoutForm {
            notes: " Ring twice ".to_string(),
            ..filled()
        };
        assert_eq!(form.validate().unwrap().notes, "Ring twice");
    }

    #[test]
    fn test_second_phone_validated_when_present() {
        let ok = CheckoutForm {
            second_phone: "+9647801234567".to_string(),
            ..filled()
        };
        assert!(ok.validate().unwrap().second_phone.is_some());

        let bad = CheckoutForm {
            second_phone: "12345".to_string(),
            ..filled()
        };
        let err = bad.validate().unwrap_err();
        assert!(matches!(
            err.for_field(FormField::SecondPhone),
            Some(FieldError::InvalidPhone { .. })
        ));
    }

    #[test]
    fn test_collects_every_failure() {
        let err = CheckoutForm::default().validate().unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(FieldError::field).collect();

        assert_eq!(
            fields,
            vec![FormField::FullName, FormField::Phone, FormField::Address]
        );
        assert_eq!(
            err.to_string(),
            "full name is required; phone number is required; address is required"
        );
    }

    #[test]
    fn test_bad_primary_phone() {
        let form = CheckoutForm {
            phone: "0770123456".to_string(),
            ..filled()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].field(), FormField::Phone);
    }
}
