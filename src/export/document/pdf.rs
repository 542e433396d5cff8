//! Serialize a [`DocumentLayout`] to PDF bytes with `lopdf`.
//!
//! Coordinates in the layout are measured from the top of the page; PDF user space starts at
//! the bottom, so every y is flipped against the page height here.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::{BillError, BillResult};

use super::layout::{DocumentLayout, PageLayout, RowKind};
use super::metrics::{encode_win_ansi, FontFace};
use super::options::{RenderOptions, Rgb};

/// Write `layout` as a PDF document.
///
/// Footers are stamped here, after pagination, because they need the final page count.
pub fn write_pdf(layout: &DocumentLayout, opts: &RenderOptions) -> BillResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = add_font(&mut doc, FontFace::Regular);
    let bold_id = add_font(&mut doc, FontFace::Bold);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FontFace::Regular.resource_name() => regular_id,
            FontFace::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.page_count());
    for (index, page) in layout.pages.iter().enumerate() {
        let mut ops = Vec::new();
        if index == 0 {
            push_text(
                &mut ops,
                FontFace::Regular,
                opts.title_font_size,
                Rgb::BLACK,
                (opts.title_x, opts.page.height - opts.title_baseline),
                &layout.title,
            );
        }
        push_rows(&mut ops, layout, page, opts);
        push_text(
            &mut ops,
            FontFace::Regular,
            opts.footer_font_size,
            opts.footer_text,
            (
                opts.page.width - opts.footer_right_offset,
                opts.footer_bottom_offset,
            ),
            &layout.footer(index),
        );

        let content = Content { operations: ops };
        let encoded = content.encode().map_err(render_err)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let media_box: Vec<Object> = vec![0i64.into(), 0i64.into(), opts.page.width.into(), opts.page.height.into()];
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => layout.page_count() as i64,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&layout.title)),
        "Producer" => Object::string_literal(concat!("billsheet ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    if opts.compress {
        doc.compress();
    }

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(render_err)?;
    Ok(out)
}

fn render_err(e: impl std::fmt::Display) -> BillError {
    BillError::Render { message: e.to_string() }
}

fn add_font(doc: &mut Document, face: FontFace) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

fn push_rows(ops: &mut Vec<Operation>, layout: &DocumentLayout, page: &PageLayout, opts: &RenderOptions) {
    let left = layout.columns.first().map(|c| c.x).unwrap_or(opts.margin_left);
    let table_width = layout.table_right() - left;
    let advance = opts.line_advance();
    let pad = opts.cell_padding;

    for row in &page.rows {
        let (fill, face, color) = match row.kind {
            RowKind::Header => (Some(opts.header_fill), FontFace::Bold, opts.header_text),
            RowKind::Body { striped: true, .. } => (Some(opts.stripe_fill), FontFace::Regular, opts.body_text),
            RowKind::Body { striped: false, .. } => (None, FontFace::Regular, opts.body_text),
        };

        if let Some(fill) = fill {
            let [r, g, b] = fill.unit();
            ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            ops.push(Operation::new(
                "re",
                vec![
                    left.into(),
                    (opts.page.height - row.top - row.height).into(),
                    table_width.into(),
                    row.height.into(),
                ],
            ));
            ops.push(Operation::new("f", vec![]));
        }

        for (column, lines) in layout.columns.iter().zip(&row.cells) {
            for (k, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline = row.top + pad + k as f32 * advance + opts.font_size * 0.9;
                push_text(
                    ops,
                    face,
                    opts.font_size,
                    color,
                    (column.x + pad, opts.page.height - baseline),
                    line,
                );
            }
        }
    }
}

fn push_text(ops: &mut Vec<Operation>, face: FontFace, size: f32, color: Rgb, (x, y): (f32, f32), text: &str) {
    let [r, g, b] = color.unit();
    ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![face.resource_name().into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]));
    ops.push(Operation::new("ET", vec![]));
}
