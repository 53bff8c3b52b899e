//! Attachment cell renderer: hyperlink or embedded picture per slot.

use image::GenericImageView;
use rust_xlsxwriter::{Format, Image, Url, Worksheet};
use tracing::{error, trace, warn};

use crate::fetch::{ImageFetcher, encode_image_png};
use crate::spec::{
    EnumCellOutcome, EnumPictureFit, EnumRenderMode, EnumSkipReason, SpecAttachmentCellReport,
    SpecAttachmentSlot, SpecPictureGeometry,
};
use crate::util::{cast_col_num, cast_row_num, plan_picture_fit};

/// Renders attachment slots of one sheet.
///
/// Formats and geometry are resolved once by the sheet writer and shared by
/// every cell.
pub struct AttachmentRenderer<'a> {
    /// Format of hyperlink cells.
    pub fmt_hyperlink: &'a Format,
    /// Display text of hyperlink cells.
    pub hyperlink_label: &'a str,
    /// Attachment cell width in pixels.
    pub width_cell: f64,
    /// Attachment cell height in pixels.
    pub height_cell: f64,
    /// Picture source.
    pub fetcher: &'a dyn ImageFetcher,
    /// Slot index to render mode decision.
    pub rule_render_mode: fn(usize) -> EnumRenderMode,
}

impl AttachmentRenderer<'_> {
    /// Render one slot into `(row_idx, col_idx)`. Never fails; problems end up
    /// in the returned outcome.
    pub fn render(
        &self,
        worksheet: &mut Worksheet,
        row_idx: usize,
        col_idx: usize,
        slot: SpecAttachmentSlot<'_>,
    ) -> SpecAttachmentCellReport {
        let mode = (self.rule_render_mode)(slot.slot_idx);
        let outcome = match mode {
            EnumRenderMode::Hyperlink => self.write_hyperlink(worksheet, row_idx, col_idx, slot.url),
            EnumRenderMode::Image => self.write_picture(worksheet, row_idx, col_idx, slot.url),
        };

        SpecAttachmentCellReport {
            row_idx,
            col_idx,
            slot_idx: slot.slot_idx,
            url: slot.url.to_string(),
            mode,
            outcome,
        }
    }

    fn write_hyperlink(
        &self,
        worksheet: &mut Worksheet,
        row_idx: usize,
        col_idx: usize,
        url: &str,
    ) -> EnumCellOutcome {
        // The writer validates the address; a rejected one falls back to the label.
        let res_write = cast_row_num(row_idx).and_then(|row| {
            let col = cast_col_num(col_idx)?;
            worksheet.write_url_with_format(
                row,
                col,
                Url::new(url).set_text(self.hyperlink_label),
                self.fmt_hyperlink,
            )?;
            Ok(())
        });

        match res_write {
            Ok(()) => EnumCellOutcome::Hyperlink,
            Err(err) => {
                error!("Error attachment url is {url}: {err}");
                self.write_hyperlink_label(worksheet, row_idx, col_idx, err.to_string())
            }
        }
    }

    fn write_hyperlink_label(
        &self,
        worksheet: &mut Worksheet,
        row_idx: usize,
        col_idx: usize,
        reason: String,
    ) -> EnumCellOutcome {
        let res_write = cast_row_num(row_idx).and_then(|row| {
            let col = cast_col_num(col_idx)?;
            worksheet.write_string_with_format(row, col, self.hyperlink_label, self.fmt_hyperlink)?;
            Ok(())
        });

        match res_write {
            Ok(()) => EnumCellOutcome::HyperlinkInvalid { reason },
            Err(err) => EnumCellOutcome::HyperlinkInvalid {
                reason: format!("{reason}; label not written: {err}"),
            },
        }
    }

    fn write_picture(
        &self,
        worksheet: &mut Worksheet,
        row_idx: usize,
        col_idx: usize,
        url: &str,
    ) -> EnumCellOutcome {
        let img = match self.fetcher.fetch(url) {
            Ok(img) => img,
            Err(err) => {
                warn!("Read attachment picture error, attachment url is {url}: {err}");
                return skip(EnumSkipReason::Fetch(err.to_string()));
            }
        };
        let (n_width_image, n_height_image) = img.dimensions();

        let v_png = match encode_image_png(&img) {
            Ok(v_png) => v_png,
            Err(err) => {
                warn!("Picture encode error, attachment url is {url}: {err}");
                return skip(EnumSkipReason::Encode(err));
            }
        };
        drop(img);

        let picture = match Image::new_from_buffer(&v_png) {
            Ok(picture) => picture,
            Err(err) => {
                warn!("Picture register error, attachment url is {url}: {err}");
                return skip(EnumSkipReason::Register(err.to_string()));
            }
        };

        let geometry = SpecPictureGeometry {
            width_cell: self.width_cell,
            height_cell: self.height_cell,
            width_image: f64::from(n_width_image),
            height_image: f64::from(n_height_image),
        };
        let fit = plan_picture_fit(&geometry);
        trace!(?geometry, ?fit, "Picture cell geometry for {url}");

        let picture = match fit {
            EnumPictureFit::Natural => picture,
            EnumPictureFit::Scaled {
                scale_width,
                scale_height,
            } => picture
                .set_scale_width(scale_width)
                .set_scale_height(scale_height),
        };

        let res_insert = cast_row_num(row_idx).and_then(|row| {
            let col = cast_col_num(col_idx)?;
            worksheet.insert_image(row, col, &picture)?;
            Ok(())
        });

        match res_insert {
            Ok(()) => EnumCellOutcome::Picture { geometry, fit },
            Err(err) => {
                warn!("Picture insert error, attachment url is {url}: {err}");
                skip(EnumSkipReason::Insert(err.to_string()))
            }
        }
    }
}

fn skip(reason: EnumSkipReason) -> EnumCellOutcome {
    EnumCellOutcome::Skipped { reason }
}
