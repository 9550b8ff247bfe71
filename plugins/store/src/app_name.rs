//! Application identity used to locate the on-disk store

/// Application identifier that decides where [`crate::FileStore`] keeps its
/// files, following the platform conventions of `directories`.
///
/// # Example
///
/// ```
/// use myrecipes_store::AppName;
///
/// let app_name = AppName::new("com", "example", "myrecipes");
/// assert_eq!(app_name.application, "myrecipes");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppName {
    pub qualifier: String,
    pub organization: String,
    pub application: String,
}

impl AppName {
    /// # Arguments
    ///
    /// * `qualifier` - Typically a reverse domain name (e.g., "com", "org")
    /// * `organization` - Organization or user name
    /// * `application` - The application name
    pub fn new(
        qualifier: impl Into<String>,
        organization: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            qualifier: qualifier.into(),
            organization: organization.into(),
            application: application.into(),
        }
    }
}

impl Default for AppName {
    fn default() -> Self {
        Self::new("com", "myrecipes", "myrecipes")
    }
}
