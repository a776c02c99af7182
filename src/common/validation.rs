// Common validation types and traits

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Checks a required text field: non-blank and at most `max_len` characters
    pub fn check_text(&mut self, field: &str, value: &str, label: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.add_error(field, &format!("{} is required", label));
        } else if value.chars().count() > max_len {
            self.add_error(
                field,
                &format!("{} must be at most {} characters", label, max_len),
            );
        }
    }

    /// Turns a failed result into `Err`, for use with `?`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}
