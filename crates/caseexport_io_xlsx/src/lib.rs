//! `caseexport_io_xlsx` v1:
//! Case record export to XLSX with alternating hyperlink and picture cells.
//!
//! Modules:
//! - `conf`   : constants and default presets
//! - `spec`   : records/options/reports/errors
//! - `util`   : pure helper functions (render rule, fit policy, geometry)
//! - `fetch`  : picture sources
//! - `render` : per-cell attachment renderer
//! - `writer` : sheet writer and export entry points
pub mod conf;
pub mod fetch;
pub mod render;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_HYPERLINK_LABEL, N_HEIGHT_ROW_MULTIPLIER, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_SCALE_LANDSCAPE_CORRECTION,
};
pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use render::AttachmentRenderer;
pub use spec::{
    CaseExportError, EnumCellOutcome, EnumPictureFit, EnumRenderMode, EnumSkipReason,
    FetchImageError, SpecAttachmentCellReport, SpecAttachmentSlot, SpecCaseExportOptions,
    SpecCaseExportReport, SpecCaseRecord, SpecCaseSheetReport, SpecCellFormat,
    SpecPictureGeometry,
};
pub use util::{derive_render_mode_alternating, plan_picture_fit};
pub use writer::{
    CaseXlsxWriter, export_cases, export_cases_with_fetcher, export_cases_with_options,
};
