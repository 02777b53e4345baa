//! Ordered accumulation of pdftk options.
//!
//! Options come in two shapes: bare flags (`flatten`, `drop_xfa`) and
//! key/value pairs (`owner_pw <secret>`, `allow Printing`). Insertion order
//! is preserved so two identically-configured documents assemble
//! byte-identical command lines.
//!
//! Passwords are **sensitive**: they go into the real argument vector but
//! must never appear in any logged or displayed rendering of the command.
//! [`OptionSet::redacted`] is the only rendering the rest of the crate is
//! allowed to log.

/// One accumulated option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub name: String,
    /// `None` for bare flags, `Some` for `keyword value` pairs.
    pub value: Option<String>,
    /// Sensitive values are excluded from every diagnostic rendering.
    pub sensitive: bool,
}

/// Insertion-ordered collection of pdftk options.
#[derive(Debug, Default, Clone)]
pub struct OptionSet {
    entries: Vec<OptionEntry>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bare flag. Adding the same flag twice is a no-op.
    pub fn push_flag(&mut self, name: &str) {
        if self.entries.iter().any(|e| e.name == name) {
            return;
        }
        self.entries.push(OptionEntry {
            name: name.to_string(),
            value: None,
            sensitive: false,
        });
    }

    /// Add a `keyword value` option. Setting the same keyword again replaces
    /// the value in place, keeping the original position.
    pub fn set_value(&mut self, name: &str, value: &str, sensitive: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.value = Some(value.to_string());
            entry.sensitive = sensitive;
            return;
        }
        self.entries.push(OptionEntry {
            name: name.to_string(),
            value: Some(value.to_string()),
            sensitive,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    /// The real tokens handed to the process, sensitive values included.
    pub fn args(&self) -> Vec<String> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.push(entry.name.clone());
            if let Some(value) = &entry.value {
                out.push(value.clone());
            }
        }
        out
    }

    /// Diagnostic rendering with sensitive values replaced by `[hidden]`.
    pub fn redacted(&self) -> Vec<String> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.push(entry.name.clone());
            if let Some(value) = &entry.value {
                if entry.sensitive {
                    out.push("[hidden]".to_string());
                } else {
                    out.push(value.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut opts = OptionSet::new();
        opts.push_flag("flatten");
        opts.set_value("allow", "Printing", false);
        opts.push_flag("drop_xfa");
        assert_eq!(
            opts.args(),
            vec!["flatten", "allow", "Printing", "drop_xfa"]
        );
    }

    #[test]
    fn duplicate_flag_is_a_noop() {
        let mut opts = OptionSet::new();
        opts.push_flag("compress");
        opts.push_flag("compress");
        assert_eq!(opts.args(), vec!["compress"]);
    }

    #[test]
    fn value_replacement_keeps_position() {
        let mut opts = OptionSet::new();
        opts.set_value("owner_pw", "first", true);
        opts.push_flag("flatten");
        opts.set_value("owner_pw", "second", true);
        assert_eq!(opts.args(), vec!["owner_pw", "second", "flatten"]);
    }

    #[test]
    fn sensitive_values_never_appear_in_redacted_form() {
        let mut opts = OptionSet::new();
        opts.set_value("owner_pw", "s3cret", true);
        opts.set_value("user_pw", "als0secret", true);
        opts.set_value("allow", "Printing", false);

        let shown = opts.redacted().join(" ");
        assert!(!shown.contains("s3cret"), "got: {shown}");
        assert!(!shown.contains("als0secret"), "got: {shown}");
        assert!(shown.contains("owner_pw [hidden]"));
        assert!(shown.contains("allow Printing"));

        // The real argv still carries the secrets.
        assert!(opts.args().contains(&"s3cret".to_string()));
    }
}
