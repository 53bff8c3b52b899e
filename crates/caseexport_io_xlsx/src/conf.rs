//! Case export constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Default worksheet row height in points.
pub const N_HEIGHT_ROW_DEFAULT_PT: f64 = 15.0;
/// Case rows are this many default rows tall to leave room for thumbnails.
pub const N_HEIGHT_ROW_MULTIPLIER: f64 = 10.0;
/// Default worksheet column width in character units.
pub const N_WIDTH_COL_DEFAULT_CHARS: f64 = 8.43;
/// Typographic points per inch.
pub const N_POINTS_PER_INCH: f64 = 72.0;
/// Screen pixels per inch used for point to pixel conversion.
pub const N_PIXELS_PER_INCH: f64 = 96.0;
/// Correction applied to the vertical scale of landscape pictures.
pub const N_SCALE_LANDSCAPE_CORRECTION: f64 = 10.0 / 4.0;

/// Column index of the case name cell.
pub const N_COL_IDX_NAME: usize = 0;
/// Column index of the case number cell.
pub const N_COL_IDX_NUMBER: usize = 1;
/// Column index of the first attachment cell.
pub const N_COL_IDX_ATTACHMENT_START: usize = 2;

/// Display text written into hyperlink cells.
pub const C_HYPERLINK_LABEL: &str = "Hyper Link";
/// Worksheet name used when none is configured.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";
/// Extension of the exported workbook file.
pub const C_EXT_FILE_OUT: &str = "xlsx";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Identity cells and row default.
    Content,
    /// Attachment hyperlink cells.
    Hyperlink,
}

impl EnumFmtKey {
    /// Key used in [`derive_default_case_formats`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Hyperlink => "hyperlink",
        }
    }
}

/// Build default named format presets used by [`crate::writer::CaseXlsxWriter`].
pub fn derive_default_case_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        valign: Some("vcenter".to_string()),
        text_wrap: Some(true),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Content.as_str().to_string(),
        cfg_base_fmt_spec.clone(),
    );
    dict_fmt.insert(
        EnumFmtKey::Hyperlink.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            underline: Some(true),
            font_color: Some("#0000FF".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}
