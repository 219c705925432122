//! Form controller: binds input fields to a typed record and gates submission on validation.

use std::{collections::BTreeMap, fmt};

/// A record that can be edited field by field and validated as a whole.
pub trait FormRecord: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    type Field: Copy + Eq + Ord + fmt::Debug + Send + Sync + 'static;

    const FIELDS: &'static [Self::Field];

    /// Name of the input the field is bound to, as the API spells it.
    fn field_name(field: Self::Field) -> &'static str;

    fn field(&self, field: Self::Field) -> &str;

    fn field_mut(&mut self, field: Self::Field) -> &mut String;

    fn validate(&self) -> Result<(), FieldErrors<Self::Field>>;
}

/// Per-field error messages. Ordered by field for stable display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord>(BTreeMap<F, String>);

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<F: Ord + Copy> FieldErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` unless the field already failed an earlier rule.
    pub fn insert(&mut self, field: F, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: F) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn remove(&mut self, field: F) {
        self.0.remove(&field);
    }

    pub(crate) fn finish(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// A record that passed its validation rules. Only produced by [`validated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<R>(R);

impl<R> Validated<R> {
    pub fn get(&self) -> &R {
        &self.0
    }

    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R> std::ops::Deref for Validated<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.0
    }
}

pub type Validation<R> = Result<Validated<R>, FieldErrors<<R as FormRecord>::Field>>;

/// Runs the record's rules and wraps it on success.
pub fn validated<R: FormRecord>(record: &R) -> Validation<R> {
    record.validate().map(|()| Validated(record.clone()))
}

pub struct Form<R: FormRecord> {
    values: R,
    errors: FieldErrors<R::Field>,
    submit_attempted: bool,
}

impl<R: FormRecord> Default for Form<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R: FormRecord> Form<R> {
    pub fn new(defaults: R) -> Self {
        Self {
            values: defaults,
            errors: FieldErrors::new(),
            submit_attempted: false,
        }
    }

    pub fn values(&self) -> &R {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors<R::Field> {
        &self.errors
    }

    pub fn error(&self, field: R::Field) -> Option<&str> {
        self.errors.get(field)
    }

    /// Binds an input to `field`.
    pub fn register(&mut self, field: R::Field) -> FieldBinding<'_, R> {
        FieldBinding { form: self, field }
    }

    /// Validates the current values and hands them to `on_valid` when they pass.
    ///
    /// On failure the field errors are stored and `on_valid` is never called.
    pub fn handle_submit<T>(&mut self, on_valid: impl FnOnce(Validated<R>) -> T) -> Option<T> {
        self.submit_attempted = true;
        match validated(&self.values) {
            Ok(record) => {
                self.errors = FieldErrors::new();
                Some(on_valid(record))
            }
            Err(errors) => {
                tracing::debug!(failed_fields = errors.len(), "form validation failed");
                self.errors = errors;
                None
            }
        }
    }

    /// Replaces every value wholesale and forgets previous errors.
    pub fn reset(&mut self, defaults: R) {
        self.values = defaults;
        self.errors = FieldErrors::new();
        self.submit_attempted = false;
    }

    fn set_field(&mut self, field: R::Field, value: String) {
        *self.values.field_mut(field) = value;
        if !self.submit_attempted {
            return;
        }
        // Re-check the whole record so cross-field rules see the new value,
        // but only touch the edited field's message.
        match self.values.validate() {
            Ok(()) => self.errors.remove(field),
            Err(errors) => match errors.get(field) {
                Some(message) => {
                    self.errors.remove(field);
                    self.errors.insert(field, message);
                }
                None => self.errors.remove(field),
            },
        }
    }
}

/// Connection between one UI input and the underlying record.
pub struct FieldBinding<'a, R: FormRecord> {
    form: &'a mut Form<R>,
    field: R::Field,
}

impl<R: FormRecord> FieldBinding<'_, R> {
    pub fn name(&self) -> &'static str {
        R::field_name(self.field)
    }

    pub fn value(&self) -> &str {
        self.form.values.field(self.field)
    }

    pub fn error(&self) -> Option<&str> {
        self.form.errors.get(self.field)
    }

    /// Change handler for the bound input.
    pub fn set(&mut self, value: impl Into<String>) {
        self.form.set_field(self.field, value.into());
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
