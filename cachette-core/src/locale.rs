/// Supplies the locale mixed into locale-aware digests.
///
/// Implemented for closures, so a request-scoped locale can be read from
/// wherever the application keeps it:
///
/// ```
/// use cachette_core::LocaleProvider;
///
/// let provider = || "pt-BR".to_string();
/// assert_eq!(provider.current_locale(), "pt-BR");
/// ```
pub trait LocaleProvider: Send + Sync {
    fn current_locale(&self) -> String;
}

impl<F> LocaleProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn current_locale(&self) -> String {
        self()
    }
}

/// A locale that never changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedLocale(pub String);

impl FixedLocale {
    pub fn new(locale: impl Into<String>) -> Self {
        Self(locale.into())
    }
}

/// English, the default locale of a new registry.
impl Default for FixedLocale {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl LocaleProvider for FixedLocale {
    fn current_locale(&self) -> String {
        self.0.clone()
    }
}
