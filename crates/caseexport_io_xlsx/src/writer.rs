//! Case sheet writer: one worksheet row per case record.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::Utc;
use rust_xlsxwriter::{Format, FormatAlign, FormatUnderline, Workbook, Worksheet};
use tracing::{debug, error, warn};

use crate::conf::{
    C_SHEET_NAME_DEFAULT, EnumFmtKey, N_COL_IDX_ATTACHMENT_START, N_COL_IDX_NAME,
    N_COL_IDX_NUMBER, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_WIDTH_COL_DEFAULT_CHARS,
    derive_default_case_formats,
};
use crate::fetch::{HttpImageFetcher, ImageFetcher};
use crate::render::AttachmentRenderer;
use crate::spec::{
    CaseExportError, EnumCellOutcome, EnumSkipReason, SpecAttachmentCellReport,
    SpecAttachmentSlot, SpecCaseExportOptions, SpecCaseExportReport, SpecCaseRecord,
    SpecCaseSheetReport, SpecCellFormat,
};
use crate::util::{
    calculate_column_width_pixels, calculate_row_height_pixels, calculate_row_height_points,
    cast_col_num, cast_row_num, derive_export_file_name, derive_unique_sheet_name,
    sanitize_sheet_name,
};

/// Stateful case workbook writer.
pub struct CaseXlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_content: Format,
    fmt_hyperlink: Format,
    options: SpecCaseExportOptions,
    fetcher: Box<dyn ImageFetcher>,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecCaseSheetReport>,
    if_closed: bool,
}

impl CaseXlsxWriter {
    /// Create writer bound to output path, format presets and picture source.
    ///
    /// Sheets are written in constant-memory mode: a row is flushed to a temp
    /// file as soon as the next row starts, and [`Self::close`] assembles the
    /// package.
    pub fn new(
        path_file_out: PathBuf,
        fmt_content: SpecCellFormat,
        fmt_hyperlink: SpecCellFormat,
        options: SpecCaseExportOptions,
        fetcher: Box<dyn ImageFetcher>,
    ) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            fmt_content: derive_rust_xlsx_format(&fmt_content),
            fmt_hyperlink: derive_rust_xlsx_format(&fmt_hyperlink),
            options,
            fetcher,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecCaseSheetReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), CaseExportError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        debug!("Saved case workbook to {}", self.path_file_out.display());
        Ok(())
    }

    /// Write one worksheet with a row per case, in input order, without header.
    pub fn write_cases(
        &mut self,
        cases: &[SpecCaseRecord],
    ) -> Result<SpecCaseSheetReport, CaseExportError> {
        if self.if_closed {
            return Err(CaseExportError::Closed);
        }
        validate_positive_option("row_height_multiplier", self.options.row_height_multiplier)?;
        if let Some(n_width) = self.options.width_attachment_col {
            validate_positive_option("width_attachment_col", n_width)?;
        }

        let sheet_name = derive_unique_sheet_name(
            &sanitize_sheet_name(
                self.options
                    .sheet_name
                    .as_deref()
                    .unwrap_or(C_SHEET_NAME_DEFAULT),
                "_",
            ),
            &mut self.set_sheet_names_existing,
        );
        let mut report = SpecCaseSheetReport {
            sheet_name: sheet_name.clone(),
            ..Default::default()
        };

        // Rows flush in order; widths, heights and row formats precede cell writes.
        let worksheet = self.workbook.add_worksheet_with_constant_memory();
        worksheet.set_name(&sheet_name)?;

        let n_height_row_pt = calculate_row_height_points(self.options.row_height_multiplier);
        let n_width_col_chars = self
            .options
            .width_attachment_col
            .unwrap_or(N_WIDTH_COL_DEFAULT_CHARS);

        if let Some(n_width) = self.options.width_attachment_col {
            let n_attachments_max = cases
                .iter()
                .map(|case| case.attachment_urls.len())
                .max()
                .unwrap_or(0);
            let n_col_end = usize::min(
                N_NCOLS_EXCEL_MAX,
                N_COL_IDX_ATTACHMENT_START + n_attachments_max,
            );
            for n_idx_col in N_COL_IDX_ATTACHMENT_START..n_col_end {
                worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width)?;
            }
        }

        let renderer = AttachmentRenderer {
            fmt_hyperlink: &self.fmt_hyperlink,
            hyperlink_label: &self.options.hyperlink_label,
            width_cell: calculate_column_width_pixels(n_width_col_chars),
            height_cell: calculate_row_height_pixels(n_height_row_pt),
            fetcher: self.fetcher.as_ref(),
            rule_render_mode: self.options.rule_render_mode,
        };

        let n_rows = usize::min(cases.len(), N_NROWS_EXCEL_MAX);
        if n_rows < cases.len() {
            let msg = format!(
                "Excel row limit reached: {} of {} cases written.",
                n_rows,
                cases.len()
            );
            warn!("{msg}");
            report.warn(msg);
        }

        for (n_idx_row, case) in cases.iter().take(n_rows).enumerate() {
            debug!("Exporting......... {} / {}", n_idx_row, n_rows);
            let row = cast_row_num(n_idx_row)?;
            worksheet.set_row_height(row, n_height_row_pt)?;
            worksheet.set_row_format(row, &self.fmt_content)?;

            write_identity_cell(
                worksheet,
                n_idx_row,
                N_COL_IDX_NAME,
                &case.name,
                &self.fmt_content,
                &mut report,
            );
            write_identity_cell(
                worksheet,
                n_idx_row,
                N_COL_IDX_NUMBER,
                &case.number,
                &self.fmt_content,
                &mut report,
            );

            let mut if_column_limit_hit = false;
            for (slot_idx, url) in case.attachment_urls.iter().enumerate() {
                let n_idx_col = N_COL_IDX_ATTACHMENT_START + slot_idx;
                if n_idx_col >= N_NCOLS_EXCEL_MAX {
                    if_column_limit_hit = true;
                    report.cells.push(SpecAttachmentCellReport {
                        row_idx: n_idx_row,
                        col_idx: n_idx_col,
                        slot_idx,
                        url: url.clone(),
                        mode: (self.options.rule_render_mode)(slot_idx),
                        outcome: EnumCellOutcome::Skipped {
                            reason: EnumSkipReason::ColumnLimit,
                        },
                    });
                    continue;
                }

                let slot = SpecAttachmentSlot {
                    slot_idx,
                    url: url.as_str(),
                };
                report
                    .cells
                    .push(renderer.render(worksheet, n_idx_row, n_idx_col, slot));
            }

            if if_column_limit_hit {
                let msg = format!(
                    "Excel column limit reached in row {n_idx_row}: {} attachments not rendered.",
                    case.attachment_urls.len() + N_COL_IDX_ATTACHMENT_START - N_NCOLS_EXCEL_MAX
                );
                warn!("{msg}");
                report.warn(msg);
            }
            report.n_rows += 1;
        }

        self.l_reports.push(report.clone());
        Ok(report)
    }
}

/// Export `cases` to `<millis>.xlsx` in the working directory, fetching
/// pictures over HTTP.
///
/// Failures are logged and recorded in the returned report, never raised.
pub fn export_cases(cases: &[SpecCaseRecord]) -> SpecCaseExportReport {
    export_cases_with_options(cases, &SpecCaseExportOptions::default())
}

/// [`export_cases`] with explicit options.
pub fn export_cases_with_options(
    cases: &[SpecCaseRecord],
    options: &SpecCaseExportOptions,
) -> SpecCaseExportReport {
    match HttpImageFetcher::new(options.timeout_fetch) {
        Ok(fetcher) => export_cases_with_fetcher(cases, Box::new(fetcher), options),
        Err(err) => {
            error!("Create picture fetcher error: {err}");
            SpecCaseExportReport {
                errors: vec![CaseExportError::from(err).to_string()],
                ..Default::default()
            }
        }
    }
}

/// [`export_cases`] with an injected picture source.
pub fn export_cases_with_fetcher(
    cases: &[SpecCaseRecord],
    fetcher: Box<dyn ImageFetcher>,
    options: &SpecCaseExportOptions,
) -> SpecCaseExportReport {
    let path_file_out = options
        .dir_out
        .join(derive_export_file_name(Utc::now().timestamp_millis()));

    let dict_fmt = derive_default_case_formats();
    let fmt_content = dict_fmt
        .get(EnumFmtKey::Content.as_str())
        .cloned()
        .unwrap_or_default();
    let fmt_hyperlink = dict_fmt
        .get(EnumFmtKey::Hyperlink.as_str())
        .cloned()
        .unwrap_or_default();

    let mut writer = CaseXlsxWriter::new(
        path_file_out.clone(),
        fmt_content,
        fmt_hyperlink,
        options.clone(),
        fetcher,
    );
    let mut report = SpecCaseExportReport {
        path_file_out,
        ..Default::default()
    };

    if let Err(err) = writer.write_cases(cases) {
        error!("Write cases to workbook error: {err}");
        report.errors.push(err.to_string());
    }
    report.sheets = writer.report();

    match writer.close() {
        Ok(()) => report.if_saved = true,
        Err(err) => {
            error!("Write workbook to {} error: {err}", writer.file_out());
            report.errors.push(err.to_string());
        }
    }

    report
}

fn write_identity_cell(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &str,
    format: &Format,
    report: &mut SpecCaseSheetReport,
) {
    let res_write = cast_row_num(row_idx).and_then(|row| {
        let col = cast_col_num(col_idx)?;
        worksheet.write_string_with_format(row, col, value, format)?;
        Ok(())
    });

    if let Err(err) = res_write {
        let msg = format!("Cell ({row_idx}, {col_idx}) not written: {err}");
        warn!("{msg}");
        report.warn(msg);
    }
}

fn validate_positive_option(name: &'static str, value: f64) -> Result<(), CaseExportError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CaseExportError::InvalidOption { name, value })
    }
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.underline.unwrap_or(false) {
        format = format.set_underline(FormatUnderline::Single);
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_valign(val)
    {
        format = format.set_align(align);
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_valign(valign: &str) -> Option<FormatAlign> {
    let value = valign.trim().to_ascii_lowercase();
    match value.as_str() {
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}
