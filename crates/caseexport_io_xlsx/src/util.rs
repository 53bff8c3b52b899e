//! Stateless helper utilities used by the case sheet writer and renderer.

use std::collections::BTreeSet;

use rust_xlsxwriter::{ColNum, RowNum};

use crate::conf::{
    C_EXT_FILE_OUT, N_HEIGHT_ROW_DEFAULT_PT, N_LEN_EXCEL_SHEET_NAME_MAX, N_PIXELS_PER_INCH,
    N_POINTS_PER_INCH, N_SCALE_LANDSCAPE_CORRECTION, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{CaseExportError, EnumPictureFit, EnumRenderMode, SpecPictureGeometry};

////////////////////////////////////////////////////////////////////////////////
// #region RenderMode

/// Even slots become hyperlinks, odd slots become embedded pictures.
pub fn derive_render_mode_alternating(slot_idx: usize) -> EnumRenderMode {
    if slot_idx % 2 == 0 {
        EnumRenderMode::Hyperlink
    } else {
        EnumRenderMode::Image
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellGeometry

/// Convert a column width in character units to pixels.
///
/// Uses the default font's 7 px max digit width plus 5 px padding.
pub fn calculate_column_width_pixels(width_chars: f64) -> f64 {
    let n_digit_width = 7.0;
    let n_padding = 5.0;
    if width_chars < 1.0 {
        (width_chars * (n_digit_width + n_padding)).round()
    } else {
        (width_chars * n_digit_width).round() + n_padding
    }
}

/// Convert a row height in points to pixels at 96 DPI.
pub fn calculate_row_height_pixels(height_points: f64) -> f64 {
    height_points / N_POINTS_PER_INCH * N_PIXELS_PER_INCH
}

/// Row height in points for a multiple of the default row height.
pub fn calculate_row_height_points(multiplier: f64) -> f64 {
    N_HEIGHT_ROW_DEFAULT_PT * multiplier
}

/// Decide how a picture is scaled inside its cell.
///
/// Pictures reaching either cell edge are scaled along one axis: portrait and
/// square pictures keep the full row height and narrow horizontally, landscape
/// pictures keep the full width and shrink vertically with the
/// [`N_SCALE_LANDSCAPE_CORRECTION`] factor.
pub fn plan_picture_fit(geometry: &SpecPictureGeometry) -> EnumPictureFit {
    let SpecPictureGeometry {
        width_cell,
        height_cell,
        width_image,
        height_image,
    } = *geometry;

    if width_cell > width_image && height_cell > height_image {
        return EnumPictureFit::Natural;
    }

    if height_image >= width_image {
        let scale_width = (height_cell * (width_image / height_image)) / width_cell;
        EnumPictureFit::Scaled {
            scale_width,
            scale_height: 1.0,
        }
    } else {
        let scale_height = (width_cell * (height_image / width_image)) / height_cell;
        EnumPictureFit::Scaled {
            scale_width: 1.0,
            scale_height: scale_height * N_SCALE_LANDSCAPE_CORRECTION,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Naming

/// Output file name for an export started at `millis_epoch`.
pub fn derive_export_file_name(millis_epoch: i64) -> String {
    format!("{millis_epoch}.{C_EXT_FILE_OUT}")
}

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Return `name` or the first free `name__N` variant, and remember it.
pub fn derive_unique_sheet_name(name: &str, set_names_existing: &mut BTreeSet<String>) -> String {
    if set_names_existing.insert(name.to_string()) {
        return name.to_string();
    }

    let mut n_idx = 2usize;
    loop {
        let c_suffix = format!("__{n_idx}");
        let c_base: String = name
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len()))
            .collect();
        let candidate = format!("{c_base}{c_suffix}");
        if set_names_existing.insert(candidate.clone()) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasting

pub(crate) fn cast_row_num(value: usize) -> Result<RowNum, CaseExportError> {
    RowNum::try_from(value).map_err(|_| CaseExportError::RowOverflow(value))
}

pub(crate) fn cast_col_num(value: usize) -> Result<ColNum, CaseExportError> {
    ColNum::try_from(value).map_err(|_| CaseExportError::ColumnOverflow(value))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
