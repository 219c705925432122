use super::*;

fn sign_up(name: &str, email: &str, password: &str, confirm_password: &str) -> CreateUser {
    CreateUser {
        name: name.into(),
        email: email.into(),
        password: password.into(),
        confirm_password: confirm_password.into(),
    }
}

fn toptal() -> CompanyDetails {
    CompanyDetails {
        name: "Toptal".into(),
        address: "SF".into(),
        vat_number: "1223".into(),
        reg_number: "1223".into(),
        iban: "BE32432934893".into(),
        swift: "TOP123".into(),
    }
}

#[test]
fn mismatched_confirmation_is_reported_on_confirm_password() {
    let errors = validate_sign_up(&sign_up("Jo", "a@b.com", "x", "y")).expect_err("mismatch");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(SignUpField::ConfirmPassword), Some(PASSWORD_MISMATCH));
}

#[test]
fn matching_sign_up_passes() {
    let validated = validate_sign_up(&sign_up("Jo", "a@b.com", "secret", "secret"))
        .expect("valid sign-up");
    assert_eq!(validated.email, "a@b.com");
}

#[test]
fn every_empty_sign_up_field_gets_a_required_message() {
    let errors = validate_sign_up(&CreateUser::default()).expect_err("empty");
    assert_eq!(errors.len(), 4);
    assert_eq!(errors.get(SignUpField::Name), Some("name is a required field"));
    assert_eq!(
        errors.get(SignUpField::ConfirmPassword),
        Some("confirmPassword is a required field")
    );
}

#[test]
fn whitespace_only_counts_as_missing() {
    let errors = validate_sign_up(&sign_up("   ", "a@b.com", "x", "x")).expect_err("blank name");
    assert_eq!(errors.get(SignUpField::Name), Some("name is a required field"));
}

#[test]
fn malformed_email_is_rejected() {
    for email in [
        "jo",
        "jo@",
        "@toptal.com",
        "jo @toptal.com",
        "a@b@c.com",
        "jo@.toptal.com",
        "jo@toptal..com",
        "jo@-toptal.com",
        "jo@toptal.com.",
    ] {
        let errors = validate_sign_up(&sign_up("Jo", email, "x", "x")).expect_err(email);
        assert_eq!(errors.get(SignUpField::Email), Some(INVALID_EMAIL), "{email}");
    }
}

#[test]
fn company_details_scenario_is_valid() {
    let validated = validate_company_details(&toptal()).expect("valid details");
    assert_eq!(validated.into_inner(), toptal());
}

#[test]
fn missing_company_fields_are_reported_by_wire_name() {
    let mut details = toptal();
    details.vat_number.clear();
    details.swift = " ".into();
    let errors = validate_company_details(&details).expect_err("missing fields");
    let reported: Vec<_> = errors.iter().collect();
    assert_eq!(
        reported,
        vec![
            (CompanyField::VatNumber, "vatNumber is a required field"),
            (CompanyField::Swift, "swift is a required field"),
        ]
    );
}

#[test]
fn surrounding_whitespace_in_email_is_tolerated() {
    assert!(validate_sign_up(&sign_up("Jo", "  jo@toptal.com ", "x", "x")).is_ok());
}
