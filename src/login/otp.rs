use crate::validation::core::OTP_LENGTH;

/// Result of typing into one OTP box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigitOutcome {
    /// More than one character, or not a digit
    Rejected,
    Updated,
    /// All boxes now hold digits; carries the full code
    Complete(String),
}

/// Four single-digit boxes with a focus cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
    digits: [Option<u8>; OTP_LENGTH],
    focus: usize,
}

impl OtpInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set box `index` to `value`, which must be one digit or empty
    pub fn input(&mut self, index: usize, value: &str) -> DigitOutcome {
        if index >= OTP_LENGTH {
            return DigitOutcome::Rejected;
        }

        let digit = match value.as_bytes() {
            [] => None,
            [b] if b.is_ascii_digit() => Some(b - b'0'),
            _ => return DigitOutcome::Rejected,
        };

        self.digits[index] = digit;
        if digit.is_some() && index < OTP_LENGTH - 1 {
            self.focus = index + 1;
        }

        if self.is_complete() {
            DigitOutcome::Complete(self.code())
        } else {
            DigitOutcome::Updated
        }
    }

    /// Backspace on an empty box moves focus back and clears the previous box
    ///
    /// Returns `true` when focus moved.
    pub fn backspace(&mut self, index: usize) -> bool {
        if index == 0 || index >= OTP_LENGTH || self.digits[index].is_some() {
            return false;
        }
        self.focus = index - 1;
        self.digits[index - 1] = None;
        true
    }

    pub fn clear(&mut self) {
        self.digits = [None; OTP_LENGTH];
        self.focus = 0;
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    /// Entered digits in order, skipping empty boxes
    #[must_use]
    pub fn code(&self) -> String {
        self.digits
            .iter()
            .flatten()
            .map(|digit| char::from(b'0' + digit))
            .collect()
    }

    #[must_use]
    pub const fn focus(&self) -> usize {
        self.focus
    }

    /// Box contents for display, `""` for empty boxes
    #[must_use]
    pub fn boxes(&self) -> Vec<String> {
        self.digits
            .iter()
            .map(|digit| digit.map(|d| d.to_string()).unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_advance_focus_and_complete() {
        let mut input = OtpInput::new();
        assert_eq!(input.input(0, "1"), DigitOutcome::Updated);
        assert_eq!(input.focus(), 1);
        assert_eq!(input.input(1, "2"), DigitOutcome::Updated);
        assert_eq!(input.input(2, "3"), DigitOutcome::Updated);
        assert_eq!(input.focus(), 3);
        assert_eq!(input.input(3, "4"), DigitOutcome::Complete("1234".to_string()));
        assert_eq!(input.focus(), 3);
    }

    #[test]
    fn test_rejects_non_digits_and_multiple_characters() {
        let mut input = OtpInput::new();
        assert_eq!(input.input(0, "a"), DigitOutcome::Rejected);
        assert_eq!(input.input(0, "12"), DigitOutcome::Rejected);
        assert_eq!(input.input(4, "1"), DigitOutcome::Rejected);
        assert_eq!(input.input(0, "٣"), DigitOutcome::Rejected);
        assert_eq!(input.boxes(), vec!["", "", "", ""]);
    }

    #[test]
    fn test_empty_value_clears_box_without_moving_focus() {
        let mut input = OtpInput::new();
        input.input(0, "5");
        assert_eq!(input.input(0, ""), DigitOutcome::Updated);
        assert_eq!(input.code(), "");
        assert_eq!(input.focus(), 1);
    }

    #[test]
    fn test_backspace_on_empty_box() {
        let mut input = OtpInput::new();
        input.input(0, "1");
        input.input(1, "2");

        // Box 2 is empty: focus moves to box 1 and clears it
        assert!(input.backspace(2));
        assert_eq!(input.focus(), 1);
        assert_eq!(input.boxes(), vec!["1", "", "", ""]);

        // Box 0 never moves
        input.clear();
        assert!(!input.backspace(0));

        // A filled box is left to the native delete
        input.input(0, "1");
        assert!(!input.backspace(0));
        input.input(1, "2");
        assert!(!input.backspace(1));
    }
}
