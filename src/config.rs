/// Configuration for package conversion.
///
/// # Examples
///
/// ```rust
/// use quince::ConvertOptions;
///
/// // Create with defaults
/// let options = ConvertOptions::default();
/// assert_eq!(options.width_tolerance, 5);
///
/// // Or customize
/// let options = ConvertOptions::new()
///     .with_width_tolerance(10)
///     .with_regenerate_table_grids(true);
/// ```
use crate::common::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default custom-property name under which the document GUID is persisted.
pub const DEFAULT_GUID_PROPERTY: &str = "DocumentGuid";

/// Options that tune how packages are read and written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Allowed discrepancy, in twips, between the grid width sum and the
    /// first row's cell width sum when a table indent explains the gap.
    pub width_tolerance: u32,
    /// Rebuild every table grid from cell widths on export instead of
    /// trusting the grid carried in the document tree.
    pub regenerate_table_grids: bool,
    /// Column width, in twips, used when a cell declares no usable width.
    pub default_column_width: u32,
    /// Custom-property name used to persist the document GUID.
    pub guid_property_name: String,
    /// Remove comment parts and their relationships on export when the
    /// document tree no longer references any comment.
    pub prune_comment_parts: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            width_tolerance: 5,
            regenerate_table_grids: false,
            default_column_width: 1440,
            guid_property_name: DEFAULT_GUID_PROPERTY.to_string(),
            prune_comment_parts: true,
        }
    }
}

impl ConvertOptions {
    /// Create a new `ConvertOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a YAML document. Missing keys keep their defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quince::ConvertOptions;
    ///
    /// let options = ConvertOptions::from_yaml("width_tolerance: 8\n").unwrap();
    /// assert_eq!(options.width_tolerance, 8);
    /// assert!(options.prune_comment_parts);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let options: Self = serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse options: {}", e)))?;
        if options.guid_property_name.is_empty() {
            return Err(Error::Config(
                "guid_property_name must not be empty".to_string(),
            ));
        }
        Ok(options)
    }

    /// Set the grid/cell width reconciliation tolerance (twips).
    #[inline]
    pub fn with_width_tolerance(mut self, tolerance: u32) -> Self {
        self.width_tolerance = tolerance;
        self
    }

    /// Force table grids to be regenerated from cell widths on export.
    #[inline]
    pub fn with_regenerate_table_grids(mut self, regenerate: bool) -> Self {
        self.regenerate_table_grids = regenerate;
        self
    }

    /// Set the fallback column width (twips).
    #[inline]
    pub fn with_default_column_width(mut self, width: u32) -> Self {
        self.default_column_width = width;
        self
    }

    /// Set the custom-property name that stores the document GUID.
    #[inline]
    pub fn with_guid_property_name(mut self, name: impl Into<String>) -> Self {
        self.guid_property_name = name.into();
        self
    }

    /// Enable or disable comment-part pruning on export.
    #[inline]
    pub fn with_prune_comment_parts(mut self, prune: bool) -> Self {
        self.prune_comment_parts = prune;
        self
    }
}
