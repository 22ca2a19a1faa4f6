use crate::{
    error::{Error, ErrorClass, ErrorOrigin},
    format,
    schema::Field,
    store::FormSubmission,
};
use thiserror::Error as ThisError;

///
/// ExportError
///

#[derive(Debug, ThisError)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv writer could not be finished")]
    Finish,

    #[error("csv output was not valid utf-8")]
    Utf8,
}

impl ExportError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Internal
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        ErrorOrigin::Submission
    }
}

impl From<ExportError> for Error {
    fn from(err: ExportError) -> Self {
        Self::new(err.class(), err.origin(), err.to_string())
    }
}

/// Tabular projection of a group's submissions.
///
/// Header is `ID, Submitted At, IP Address` followed by one column per
/// field in group order; one row per submission in storage order.
/// Multi-valued cells join raw elements with `", "`.
pub(crate) fn render_csv(
    fields: &[&Field],
    submissions: &[&FormSubmission],
) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "ID".to_string(),
        "Submitted At".to_string(),
        "IP Address".to_string(),
    ];
    header.extend(fields.iter().map(|f| f.label.clone()));
    writer.write_record(&header)?;

    for submission in submissions {
        let mut row = vec![
            submission.id.to_string(),
            format::format_timestamp(submission.created_at),
            submission.ip_address.clone().unwrap_or_default(),
        ];
        row.extend(
            fields
                .iter()
                .map(|field| submission.value(&field.key).map(format::join_raw).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|_| ExportError::Finish)?;
    String::from_utf8(bytes).map_err(|_| ExportError::Utf8)
}

///
/// TESTS
///
