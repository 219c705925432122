//! Validation rules for the sign-up and company-details forms.

use shared::domain::{CompanyDetails, CreateUser};
use validator::ValidateEmail;

use crate::form::{validated, FieldErrors, FormRecord, Validation};

pub const PASSWORD_MISMATCH: &str = "Passwords must match";
pub const INVALID_EMAIL: &str = "Must be a valid email";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignUpField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompanyField {
    Name,
    Address,
    VatNumber,
    RegNumber,
    Iban,
    Swift,
}

fn required_message(field: &str) -> String {
    format!("{field} is a required field")
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_sign_up(candidate: &CreateUser) -> Validation<CreateUser> {
    validated(candidate)
}

pub fn validate_company_details(candidate: &CompanyDetails) -> Validation<CompanyDetails> {
    validated(candidate)
}

impl FormRecord for CreateUser {
    type Field = SignUpField;

    const FIELDS: &'static [SignUpField] = &[
        SignUpField::Name,
        SignUpField::Email,
        SignUpField::Password,
        SignUpField::ConfirmPassword,
    ];

    fn field_name(field: SignUpField) -> &'static str {
        match field {
            SignUpField::Name => "name",
            SignUpField::Email => "email",
            SignUpField::Password => "password",
            SignUpField::ConfirmPassword => "confirmPassword",
        }
    }

    fn field(&self, field: SignUpField) -> &str {
        match field {
            SignUpField::Name => &self.name,
            SignUpField::Email => &self.email,
            SignUpField::Password => &self.password,
            SignUpField::ConfirmPassword => &self.confirm_password,
        }
    }

    fn field_mut(&mut self, field: SignUpField) -> &mut String {
        match field {
            SignUpField::Name => &mut self.name,
            SignUpField::Email => &mut self.email,
            SignUpField::Password => &mut self.password,
            SignUpField::ConfirmPassword => &mut self.confirm_password,
        }
    }

    fn validate(&self) -> Result<(), FieldErrors<SignUpField>> {
        let mut errors = FieldErrors::new();
        for &field in Self::FIELDS {
            if is_blank(self.field(field)) {
                errors.insert(field, required_message(Self::field_name(field)));
            }
        }
        if !errors.contains(SignUpField::Email) && !self.email.trim().validate_email() {
            errors.insert(SignUpField::Email, INVALID_EMAIL);
        }
        if !errors.contains(SignUpField::ConfirmPassword) && self.confirm_password != self.password
        {
            errors.insert(SignUpField::ConfirmPassword, PASSWORD_MISMATCH);
        }
        errors.finish()
    }
}

impl FormRecord for CompanyDetails {
    type Field = CompanyField;

    const FIELDS: &'static [CompanyField] = &[
        CompanyField::Name,
        CompanyField::Address,
        CompanyField::VatNumber,
        CompanyField::RegNumber,
        CompanyField::Iban,
        CompanyField::Swift,
    ];

    fn field_name(field: CompanyField) -> &'static str {
        match field {
            CompanyField::Name => "name",
            CompanyField::Address => "address",
            CompanyField::VatNumber => "vatNumber",
            CompanyField::RegNumber => "regNumber",
            CompanyField::Iban => "iban",
            CompanyField::Swift => "swift",
        }
    }

    fn field(&self, field: CompanyField) -> &str {
        match field {
            CompanyField::Name => &self.name,
            CompanyField::Address => &self.address,
            CompanyField::VatNumber => &self.vat_number,
            CompanyField::RegNumber => &self.reg_number,
            CompanyField::Iban => &self.iban,
            CompanyField::Swift => &self.swift,
        }
    }

    fn field_mut(&mut self, field: CompanyField) -> &mut String {
        match field {
            CompanyField::Name => &mut self.name,
            CompanyField::Address => &mut self.address,
            CompanyField::VatNumber => &mut self.vat_number,
            CompanyField::RegNumber => &mut self.reg_number,
            CompanyField::Iban => &mut self.iban,
            CompanyField::Swift => &mut self.swift,
        }
    }

    fn validate(&self) -> Result<(), FieldErrors<CompanyField>> {
        let mut errors = FieldErrors::new();
        for &field in Self::FIELDS {
            if is_blank(self.field(field)) {
                errors.insert(field, required_message(Self::field_name(field)));
            }
        }
        errors.finish()
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
