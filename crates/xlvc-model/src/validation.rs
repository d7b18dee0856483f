//! Data validation builder and utilities.
//!
//! Provides a high-level API for adding, querying, and removing data validation
//! rules on worksheet cells.

use serde::{Deserialize, Serialize};
use crate::error::Result;
use xlvc_xml::worksheet::{DataValidation, DataValidations, WorksheetXml};

/// The type of data validation to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationType {
    Whole,
    Decimal,
    List,
    Date,
    Time,
    TextLength,
    Custom,
}

impl ValidationType {
    /// Convert to the XML attribute string.
    pub fn as_str(&self) -> &str {
        match self {
            ValidationType::Whole => "whole",
            ValidationType::Decimal => "decimal",
            ValidationType::List => "list",
            ValidationType::Date => "date",
            ValidationType::Time => "time",
            ValidationType::TextLength => "textLength",
            ValidationType::Custom => "custom",
        }
    }

    /// Parse from the XML attribute string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "whole" => Some(ValidationType::Whole),
            "decimal" => Some(ValidationType::Decimal),
            "list" => Some(ValidationType::List),
            "date" => Some(ValidationType::Date),
            "time" => Some(ValidationType::Time),
            "textLength" => Some(ValidationType::TextLength),
            "custom" => Some(ValidationType::Custom),
            _ => None,
        }
    }
}

/// The comparison operator for data validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationOperator {
    Between,
    NotBetween,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ValidationOperator {
    /// Convert to the XML attribute string.
    pub fn as_str(&self) -> &str {
        match self {
            ValidationOperator::Between => "between",
            ValidationOperator::NotBetween => "notBetween",
            ValidationOperator::Equal => "equal",
            ValidationOperator::NotEqual => "notEqual",
            ValidationOperator::LessThan => "lessThan",
            ValidationOperator::LessThanOrEqual => "lessThanOrEqual",
            ValidationOperator::GreaterThan => "greaterThan",
            ValidationOperator::GreaterThanOrEqual => "greaterThanOrEqual",
        }
    }

    /// Parse from the XML attribute string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "between" => Some(ValidationOperator::Between),
            "notBetween" => Some(ValidationOperator::NotBetween),
            "equal" => Some(ValidationOperator::Equal),
            "notEqual" => Some(ValidationOperator::NotEqual),
            "lessThan" => Some(ValidationOperator::LessThan),
            "lessThanOrEqual" => Some(ValidationOperator::LessThanOrEqual),
            "greaterThan" => Some(ValidationOperator::GreaterThan),
            "greaterThanOrEqual" => Some(ValidationOperator::GreaterThanOrEqual),
            _ => None,
        }
    }
}

/// The error display style for validation failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ErrorStyle {
    Stop,
    Warning,
    Information,
}

impl ErrorStyle {
    /// Convert to the XML attribute string.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorStyle::Stop => "stop",
            ErrorStyle::Warning => "warning",
            ErrorStyle::Information => "information",
        }
    }

    /// Parse from the XML attribute string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stop" => Some(ErrorStyle::Stop),
            "warning" => Some(ErrorStyle::Warning),
            "information" => Some(ErrorStyle::Information),
            _ => None,
        }
    }
}

/// Configuration for a data validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidationConfig {
    /// The cell range to apply validation to (e.g. "A1:A100").
    pub sqref: String,
    /// The type of validation.
    pub validation_type: ValidationType,
    /// The comparison operator (not used for list validations).
    pub operator: Option<ValidationOperator>,
    /// The first formula/value for the validation constraint.
    pub formula1: Option<String>,
    /// The second formula/value (used with Between/NotBetween operators).
    pub formula2: Option<String>,
    /// Whether blank cells are allowed.
    pub allow_blank: bool,
    /// The error display style.
    pub error_style: Option<ErrorStyle>,
    /// The title for the error dialog.
    pub error_title: Option<String>,
    /// The message for the error dialog.
    pub error_message: Option<String>,
    /// The title for the input prompt.
    pub prompt_title: Option<String>,
    /// The message for the input prompt.
    pub prompt_message: Option<String>,
    /// Whether to show the input message when the cell is selected.
    pub show_input_message: bool,
    /// Whether to show the error message on invalid input.
    pub show_error_message: bool,
}

/// A data-validation rule attached to a single cell, carried by
/// [`crate::cell::Cell::validation`]. Identical to a `DataValidationConfig`
/// minus the `sqref` range, since the owning cell already fixes its scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub validation_type: ValidationType,
    pub operator: Option<ValidationOperator>,
    pub formula1: Option<String>,
    pub formula2: Option<String>,
    pub allow_blank: bool,
    pub error_style: Option<ErrorStyle>,
    pub error_title: Option<String>,
    pub error_message: Option<String>,
}

impl From<&DataValidationConfig> for ValidationRule {
    fn from(config: &DataValidationConfig) -> Self {
        ValidationRule {
            validation_type: config.validation_type.clone(),
            operator: config.operator.clone(),
            formula1: config.formula1.clone(),
            formula2: config.formula2.clone(),
            allow_blank: config.allow_blank,
            error_style: config.error_style.clone(),
            error_title: config.error_title.clone(),
            error_message: config.error_message.clone(),
        }
    }
}

impl DataValidationConfig {
    /// Create a dropdown list validation.
    ///
    /// The items are joined with commas and quoted for the formula.
    pub fn dropdown(sqref: &str, items: &[&str]) -> Self {
        let formula = format!("\"{}\"", items.join(","));
        Self {
            sqref: sqref.to_string(),
            validation_type: ValidationType::List,
            operator: None,
            formula1: Some(formula),
            formula2: None,
            allow_blank: true,
            error_style: Some(ErrorStyle::Stop),
            error_title: None,
            error_message: None,
            prompt_title: None,
            prompt_message: None,
            show_input_message: true,
            show_error_message: true,
        }
    }

    /// Create a whole number range validation (between min and max).
    pub fn whole_number(sqref: &str, min: i64, max: i64) -> Self {
        Self {
            sqref: sqref.to_string(),
            validation_type: ValidationType::Whole,
            operator: Some(ValidationOperator::Between),
            formula1: Some(min.to_string()),
            formula2: Some(max.to_string()),
            allow_blank: true,
            error_style: Some(ErrorStyle::Stop),
            error_title: None,
            error_message: None,
            prompt_title: None,
            prompt_message: None,
            show_input_message: true,
            show_error_message: true,
        }
    }

    /// Create a decimal range validation (between min and max).
    pub fn decimal(sqref: &str, min: f64, max: f64) -> Self {
        Self {
            sqref: sqref.to_string(),
            validation_type: ValidationType::Decimal,
            operator: Some(ValidationOperator::Between),
            formula1: Some(min.to_string()),
            formula2: Some(max.to_string()),
            allow_blank: true,
            error_style: Some(ErrorStyle::Stop),
            error_title: None,
            error_message: None,
            prompt_title: None,
            prompt_message: None,
            show_input_message: true,
            show_error_message: true,
        }
    }

    /// Create a text length validation.
    pub fn text_length(sqref: &str, operator: ValidationOperator, length: u32) -> Self {
        Self {
            sqref: sqref.to_string(),
            validation_type: ValidationType::TextLength,
            operator: Some(operator),
            formula1: Some(length.to_string()),
            formula2: None,
            allow_blank: true,
            error_style: Some(ErrorStyle::Stop),
            error_title: None,
            error_message: None,
            prompt_title: None,
            prompt_message: None,
            show_input_message: true,
            show_error_message: true,
        }
    }
}

/// Convert a `DataValidationConfig` to the XML `DataValidation` struct.
pub fn config_to_xml(config: &DataValidationConfig) -> DataValidation {
    DataValidation {
        validation_type: Some(config.validation_type.as_str().to_string()),
        operator: config.operator.as_ref().map(|o| o.as_str().to_string()),
        allow_blank: if config.allow_blank { Some(true) } else { None },
        show_input_message: if config.show_input_message {
            Some(true)
        } else {
            None
        },
        show_error_message: if config.show_error_message {
            Some(true)
        } else {
            None
        },
        error_style: config.error_style.as_ref().map(|e| e.as_str().to_string()),
        error_title: config.error_title.clone(),
        error: config.error_message.clone(),
        prompt_title: config.prompt_title.clone(),
        prompt: config.prompt_message.clone(),
        sqref: config.sqref.clone(),
        formula1: config.formula1.clone(),
        formula2: config.formula2.clone(),
    }
}

/// Convert an XML `DataValidation` to a `DataValidationConfig`.
fn xml_to_config(dv: &DataValidation) -> DataValidationConfig {
    DataValidationConfig {
        sqref: dv.sqref.clone(),
        validation_type: dv
            .validation_type
            .as_deref()
            .and_then(ValidationType::parse)
            .unwrap_or(ValidationType::Whole),
        operator: dv.operator.as_deref().and_then(ValidationOperator::parse),
        formula1: dv.formula1.clone(),
        formula2: dv.formula2.clone(),
        allow_blank: dv.allow_blank.unwrap_or(false),
        error_style: dv.error_style.as_deref().and_then(ErrorStyle::parse),
        error_title: dv.error_title.clone(),
        error_message: dv.error.clone(),
        prompt_title: dv.prompt_title.clone(),
        prompt_message: dv.prompt.clone(),
        show_input_message: dv.show_input_message.unwrap_or(false),
        show_error_message: dv.show_error_message.unwrap_or(false),
    }
}

/// Add a data validation to a worksheet.
pub fn add_validation(ws: &mut WorksheetXml, config: &DataValidationConfig) -> Result<()> {
    let dv = config_to_xml(config);
    let dvs = ws.data_validations.get_or_insert_with(|| DataValidations {
        count: Some(0),
        data_validations: Vec::new(),
    });
    dvs.data_validations.push(dv);
    dvs.count = Some(dvs.data_validations.len() as u32);
    Ok(())
}

/// Get all data validations from a worksheet.
pub fn get_validations(ws: &WorksheetXml) -> Vec<DataValidationConfig> {
    match &ws.data_validations {
        Some(dvs) => dvs.data_validations.iter().map(xml_to_config).collect(),
        None => Vec::new(),
    }
}

/// Remove validations matching a specific cell range from a worksheet.
///
/// Returns `Ok(())` regardless of whether any validations were actually removed.
pub fn remove_validation(ws: &mut WorksheetXml, sqref: &str) -> Result<()> {
    if let Some(ref mut dvs) = ws.data_validations {
        dvs.data_validations.retain(|dv| dv.sqref != sqref);
        dvs.count = Some(dvs.data_validations.len() as u32);
        if dvs.data_validations.is_empty() {
            ws.data_validations = None;
        }
    }
    Ok(())
}
