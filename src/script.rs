//! Template rendering for the scripts sent to the scripting host.
//!
//! Each operation owns a fixed script body with named slots (`{az}`, `{ra}`,
//! …). [`Template::render`] substitutes caller-supplied values into those
//! slots and produces a [`RenderedScript`] ready for the transport.

use crate::error::{BridgeError, Result};

/// Character sequences that would let a substituted value escape its string
/// literal and smuggle statements or comments into the script.
const FORBIDDEN: &[&str] = &[";", "\"", "\n", "\r", "//", "/*", "*/"];

/// A fixed script body with named substitution slots.
///
/// Slots appear in the body as `{name}`. Every slot must receive a value at
/// render time; an absent optional parameter is rendered as the empty string
/// so the script stays syntactically complete (the script bodies guard empty
/// coordinates with a truthiness check on the remote side).
pub struct Template {
    name: &'static str,
    body: &'static str,
    slots: &'static [&'static str],
}

impl Template {
    pub const fn new(
        name: &'static str,
        body: &'static str,
        slots: &'static [&'static str],
    ) -> Self {
        Self { name, body, slots }
    }

    /// The operation name this template belongs to.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Substitute `values` into the template's slots.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] if a slot has no value, a
    /// value names no slot, or a value contains one of the sequences in
    /// [`FORBIDDEN`].
    ///
    /// # Example
    ///
    /// ```
    /// use skybridge::script::Template;
    ///
    /// const T: Template = Template::new("demo", "var A = \"{a}\";", &["a"]);
    /// let script = T.render(&[("a", "1.5".to_string())]).unwrap();
    /// assert_eq!(script.text(), "var A = \"1.5\";");
    /// ```
    pub fn render(&self, values: &[(&str, String)]) -> Result<RenderedScript> {
        for (key, _) in values {
            if !self.slots.contains(key) {
                return Err(self.invalid(format!("no slot named {{{key}}}")));
            }
        }

        let mut text = self.body.to_string();
        for slot in self.slots {
            let value = values
                .iter()
                .find(|(key, _)| key == slot)
                .map(|(_, value)| value.as_str())
                .ok_or_else(|| self.invalid(format!("missing value for slot {{{slot}}}")))?;
            self.check_token(slot, value)?;
            text = text.replace(&format!("{{{slot}}}"), value);
        }

        Ok(RenderedScript { text })
    }

    /// Reject values that could terminate the enclosing string literal or
    /// open a comment inside the rendered script.
    fn check_token(&self, slot: &str, value: &str) -> Result<()> {
        for seq in FORBIDDEN {
            if value.contains(seq) {
                return Err(self.invalid(format!("value for {{{slot}}} contains {seq:?}")));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> BridgeError {
        BridgeError::InvalidParameter {
            operation: self.name,
            reason,
        }
    }
}

/// The text of one fully rendered script.
///
/// Owned solely by the call that produced it; handed to the transport once
/// and never reused, since substitution is textual rather than structural.
#[derive(Debug, Clone)]
pub struct RenderedScript {
    text: String,
}

impl RenderedScript {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}
