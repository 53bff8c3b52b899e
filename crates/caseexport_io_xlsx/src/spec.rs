//! Shared case export specification models and error types.

use std::path::PathBuf;
use std::time::Duration;

use rust_xlsxwriter::XlsxError;

use crate::conf::{C_HYPERLINK_LABEL, N_HEIGHT_ROW_MULTIPLIER};
use crate::util::derive_render_mode_alternating;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification for case rows and hyperlink cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Single underline.
    pub underline: Option<bool>,
    /// Font color, `#RRGGBB`.
    pub font_color: Option<String>,

    /// Vertical alignment: `top`, `vcenter` or `bottom`.
    pub valign: Option<String>,
    /// Text wrap.
    pub text_wrap: Option<bool>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            underline: other.underline.or(self.underline),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            text_wrap: other.text_wrap.or(self.text_wrap),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CaseInput

/// One exportable case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCaseRecord {
    /// Display name, written to column 0.
    pub name: String,
    /// Case number, written to column 1 as text.
    pub number: String,
    /// Attachment URLs, one cell each from column 2 on.
    pub attachment_urls: Vec<String>,
}

/// One attachment position inside a case row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecAttachmentSlot<'a> {
    /// Zero-based position inside the case's attachment list.
    pub slot_idx: usize,
    /// Attachment URL.
    pub url: &'a str,
}

/// How an attachment slot is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRenderMode {
    /// Labelled URL hyperlink.
    Hyperlink,
    /// Fetched and embedded picture.
    Image,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PictureFit

/// Pixel geometry of one picture cell and the decoded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecPictureGeometry {
    /// Cell width in pixels.
    pub width_cell: f64,
    /// Cell height in pixels.
    pub height_cell: f64,
    /// Native image width in pixels.
    pub width_image: f64,
    /// Native image height in pixels.
    pub height_image: f64,
}

/// Scale decision for an embedded picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnumPictureFit {
    /// Picture fits inside the cell and keeps its natural size.
    Natural,
    /// Picture is scaled relative to its natural size.
    Scaled {
        /// Horizontal scale factor.
        scale_width: f64,
        /// Vertical scale factor.
        scale_height: f64,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Export-wide options.
#[derive(Debug, Clone)]
pub struct SpecCaseExportOptions {
    /// Directory receiving `<millis>.xlsx`.
    pub dir_out: PathBuf,
    /// Worksheet name; the workbook default is used when `None`.
    pub sheet_name: Option<String>,
    /// Case row height as a multiple of the default row height. Must be positive.
    pub row_height_multiplier: f64,
    /// Explicit attachment column width in characters. Must be positive.
    pub width_attachment_col: Option<f64>,
    /// Display text of hyperlink cells.
    pub hyperlink_label: String,
    /// Slot index to render mode decision.
    pub rule_render_mode: fn(usize) -> EnumRenderMode,
    /// HTTP timeout for picture fetches. `None` waits indefinitely.
    pub timeout_fetch: Option<Duration>,
}

impl Default for SpecCaseExportOptions {
    fn default() -> Self {
        Self {
            dir_out: PathBuf::from("."),
            sheet_name: None,
            row_height_multiplier: N_HEIGHT_ROW_MULTIPLIER,
            width_attachment_col: None,
            hyperlink_label: C_HYPERLINK_LABEL.to_string(),
            rule_render_mode: derive_render_mode_alternating,
            timeout_fetch: None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Why an attachment cell was left without content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSkipReason {
    /// Network, HTTP status, or decode failure.
    Fetch(String),
    /// PNG re-encode failure.
    Encode(String),
    /// The workbook rejected the encoded picture.
    Register(String),
    /// Writing into the worksheet failed.
    Insert(String),
    /// Cell lies beyond the worksheet column limit.
    ColumnLimit,
}

/// Result of rendering one attachment cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellOutcome {
    /// Label, hyperlink and style written.
    Hyperlink,
    /// Label and style written without a hyperlink.
    HyperlinkInvalid {
        /// Validation or writer error text.
        reason: String,
    },
    /// Picture registered and anchored at the cell.
    Picture {
        /// Cell and image pixel sizes.
        geometry: SpecPictureGeometry,
        /// Applied scale.
        fit: EnumPictureFit,
    },
    /// Nothing written.
    Skipped {
        /// Failure cause.
        reason: EnumSkipReason,
    },
}

/// Report entry for one attachment cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecAttachmentCellReport {
    /// Worksheet row index.
    pub row_idx: usize,
    /// Worksheet column index.
    pub col_idx: usize,
    /// Position inside the case's attachment list.
    pub slot_idx: usize,
    /// Attachment URL.
    pub url: String,
    /// Selected render mode.
    pub mode: EnumRenderMode,
    /// Render result.
    pub outcome: EnumCellOutcome,
}

/// Per-sheet write report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCaseSheetReport {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Number of case rows written.
    pub n_rows: usize,
    /// Attachment cells in write order.
    pub cells: Vec<SpecAttachmentCellReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecCaseSheetReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Number of cells holding a picture.
    pub fn count_pictures(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell.outcome, EnumCellOutcome::Picture { .. }))
            .count()
    }

    /// Number of cells left without content.
    pub fn count_skipped(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell.outcome, EnumCellOutcome::Skipped { .. }))
            .count()
    }
}

/// Report for one full export call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCaseExportReport {
    /// Target workbook path.
    pub path_file_out: PathBuf,
    /// Whether the workbook reached disk.
    pub if_saved: bool,
    /// Sheets written before saving.
    pub sheets: Vec<SpecCaseSheetReport>,
    /// Terminal failures, already logged.
    pub errors: Vec<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failure to obtain a decoded image for a URL.
#[derive(Debug, thiserror::Error)]
pub enum FetchImageError {
    /// HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    /// Request could not be sent or completed.
    #[error("Request failed for {url}: {message}")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport error text.
        message: String,
    },
    /// Server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// Body bytes are not a supported image.
    #[error("Cannot decode image from {url}: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder error text.
        message: String,
    },
}

/// Top-level writer errors.
#[derive(Debug, thiserror::Error)]
pub enum CaseExportError {
    /// Writer already flushed.
    #[error("Cannot write after close().")]
    Closed,
    /// Option value the sheet geometry cannot use.
    #[error("invalid option `{name}`: {value}")]
    InvalidOption {
        /// Option field name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Row index does not fit the worksheet row type.
    #[error("row index overflow: {0}")]
    RowOverflow(usize),
    /// Column index does not fit the worksheet column type.
    #[error("column index overflow: {0}")]
    ColumnOverflow(usize),
    /// Underlying workbook writer failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Image fetcher setup failure.
    #[error(transparent)]
    Fetch(#[from] FetchImageError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
