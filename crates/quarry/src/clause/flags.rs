//! Statement keyword flags (DISTINCT, dialect modifiers).

/// Accumulates keyword flags emitted right after the statement keyword, in
/// insertion order.
#[derive(Clone, Debug, Default)]
pub struct Flags {
    entries: Vec<String>,
}

impl Flags {
    /// Enable or disable a flag. Enabling an already-set flag is a no-op.
    pub fn set(&mut self, flag: &str, enable: bool) {
        if enable {
            if !self.entries.iter().any(|f| f == flag) {
                self.entries.push(flag.to_string());
            }
        } else {
            self.entries.retain(|f| f != flag);
        }
    }

    /// Whether no flags are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the fragment, empty string if unused.
    pub fn build(&self) -> String {
        if self.entries.is_empty() {
            String::new()
        } else {
            format!(" {}", self.entries.join(" "))
        }
    }

    /// Clear all flags.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
